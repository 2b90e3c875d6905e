/// Rows of one GTFS table in file order, with the header they were read with.
#[derive(Debug, Clone)]
pub struct CsvTable<T> {
    pub headers: Vec<String>,
    pub rows: Vec<T>,
    /// 1-based source line of each row; `None` for rows added programmatically.
    pub row_numbers: Vec<Option<usize>>,
}

impl<T> Default for CsvTable<T> {
    fn default() -> Self {
        Self {
            headers: Vec::new(),
            rows: Vec::new(),
            row_numbers: Vec::new(),
        }
    }
}

impl<T> CsvTable<T> {
    pub fn push(&mut self, row: T, row_number: Option<usize>) {
        self.rows.push(row);
        self.row_numbers.push(row_number);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_number(&self, index: usize) -> Option<usize> {
        self.row_numbers.get(index).copied().flatten()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }
}

impl<'a, T> IntoIterator for &'a CsvTable<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

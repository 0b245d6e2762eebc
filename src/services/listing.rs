//! Generic paginated table: page/size/search state, server fetch, client-side
//! sort of the loaded page and a plain-text rendering.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::domain::{ApiError, PageMeta, PageRequest, Resource};
use crate::services::entity_manager::EntityManager;
use crate::services::notify::{Notice, Notifier};

pub const SORT_SCOPE_NOTE: &str = "orden aplicado a la página actual";

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Number(f64),
    Bool(bool),
    Empty,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    pub fn opt_text(value: Option<&str>) -> Self {
        value.map_or(CellValue::Empty, |v| CellValue::Text(v.to_string()))
    }

    /// Empty cells sort last; mixed kinds compare by their rendering.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        use CellValue::*;
        match (self, other) {
            (Empty, Empty) => Ordering::Equal,
            (Empty, _) => Ordering::Greater,
            (_, Empty) => Ordering::Less,
            (Int(a), Int(b)) => a.cmp(b),
            (Number(a), Number(b)) => a.total_cmp(b),
            (Int(a), Number(b)) => (*a as f64).total_cmp(b),
            (Number(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Bool(a), Bool(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (a, b) => a.to_string().cmp(&b.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Int(n) => write!(f, "{}", n),
            CellValue::Number(n) => write!(f, "{:.2}", n),
            CellValue::Bool(true) => f.write_str("Sí"),
            CellValue::Bool(false) => f.write_str("No"),
            CellValue::Empty => f.write_str("-"),
        }
    }
}

/// A table column described by the caller.
pub struct Column<T> {
    pub key: &'static str,
    pub title: &'static str,
    pub sortable: bool,
    pub cell: fn(&T) -> CellValue,
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Column<T> {}

impl<T> Column<T> {
    pub fn new(key: &'static str, title: &'static str, cell: fn(&T) -> CellValue) -> Self {
        Self {
            key,
            title,
            sortable: true,
            cell,
        }
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDescriptor {
    pub key: String,
    pub direction: SortDirection,
}

pub fn sort_rows<T>(rows: &mut [T], column: &Column<T>, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ord = (column.cell)(a).compare(&(column.cell)(b));
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

/// List state for one resource screen.
pub struct PagedList<R: Resource> {
    manager: EntityManager<R>,
    notifier: Arc<dyn Notifier>,
    request: PageRequest,
    rows: Vec<R::Model>,
    meta: PageMeta,
    sort: Option<(SortDescriptor, Column<R::Model>)>,
    last_error: Option<ApiError>,
}

impl<R: Resource> PagedList<R> {
    pub fn new(manager: EntityManager<R>, notifier: Arc<dyn Notifier>, page_size: u64) -> Self {
        let request = PageRequest::new(1, page_size);
        let meta = PageMeta::for_request(0, &request);
        Self {
            manager,
            notifier,
            request,
            rows: Vec::new(),
            meta,
            sort: None,
            last_error: None,
        }
    }

    /// Start from `request` instead of the first page; nothing is fetched.
    pub fn with_request(mut self, request: PageRequest) -> Self {
        self.meta = PageMeta::for_request(0, &request);
        self.request = request;
        self
    }

    /// Fetch the current page. On failure the table shows the empty state and
    /// a notice is emitted; the error stays available through [`Self::last_error`].
    pub async fn refresh(&mut self) -> bool {
        match self.manager.list(&self.request).await {
            Ok(page) => {
                self.rows = page.data;
                self.meta = page.meta;
                self.last_error = None;
                self.apply_sort();
                true
            }
            Err(e) => {
                tracing::warn!("Could not load {}: {}", R::PATH, e);
                self.notifier.notify(Notice::from_error(&e));
                self.rows.clear();
                self.meta = PageMeta::for_request(0, &self.request);
                self.last_error = Some(e);
                false
            }
        }
    }

    pub async fn set_page(&mut self, page: u64) -> bool {
        self.request.page = page.max(1);
        self.refresh().await
    }

    pub async fn set_page_size(&mut self, limit: u64) -> bool {
        self.request.limit = limit.max(1);
        self.request.page = 1;
        self.refresh().await
    }

    /// A new search always starts from the first page.
    pub async fn set_search(&mut self, search: impl Into<String>) -> bool {
        self.request.search = search.into();
        self.request.page = 1;
        self.refresh().await
    }

    pub async fn set_filter(&mut self, key: &str, value: Option<String>) -> bool {
        match value {
            Some(v) => self.request.filters.insert(key.to_string(), v),
            None => self.request.filters.remove(key),
        };
        self.request.page = 1;
        self.refresh().await
    }

    /// Sort the loaded page by `column`; sorting again by the same column
    /// flips the direction. No request is made.
    pub fn sort_by(&mut self, column: Column<R::Model>) {
        if !column.sortable {
            return;
        }
        let direction = match &self.sort {
            Some((current, _)) if current.key == column.key => match current.direction {
                SortDirection::Asc => SortDirection::Desc,
                SortDirection::Desc => SortDirection::Asc,
            },
            _ => SortDirection::Asc,
        };
        self.sort_with(column, direction);
    }

    pub fn sort_with(&mut self, column: Column<R::Model>, direction: SortDirection) {
        let descriptor = SortDescriptor {
            key: column.key.to_string(),
            direction,
        };
        self.sort = Some((descriptor, column));
        self.apply_sort();
    }

    fn apply_sort(&mut self) {
        if let Some((descriptor, column)) = &self.sort {
            sort_rows(&mut self.rows, column, descriptor.direction);
        }
    }

    pub fn rows(&self) -> &[R::Model] {
        &self.rows
    }

    pub fn meta(&self) -> &PageMeta {
        &self.meta
    }

    pub fn request(&self) -> &PageRequest {
        &self.request
    }

    pub fn total(&self) -> u64 {
        self.meta.total
    }

    pub fn page(&self) -> u64 {
        self.request.page
    }

    pub fn total_pages(&self) -> u64 {
        self.meta.total_pages()
    }

    pub fn sort(&self) -> Option<&SortDescriptor> {
        self.sort.as_ref().map(|(d, _)| d)
    }

    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    pub fn manager(&self) -> &EntityManager<R> {
        &self.manager
    }

    pub fn view(&self, columns: &[Column<R::Model>]) -> TableView {
        TableView::build(
            columns,
            &self.rows,
            &self.meta,
            self.request.page,
            self.sort(),
        )
    }
}

/// Rendered table, ready to print.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub footer: String,
    pub note: Option<String>,
}

impl TableView {
    pub fn build<T>(
        columns: &[Column<T>],
        rows: &[T],
        meta: &PageMeta,
        page: u64,
        sort: Option<&SortDescriptor>,
    ) -> Self {
        let headers = columns
            .iter()
            .map(|c| match sort {
                Some(s) if s.key == c.key => {
                    let arrow = match s.direction {
                        SortDirection::Asc => "↑",
                        SortDirection::Desc => "↓",
                    };
                    format!("{} {}", c.title, arrow)
                }
                _ => c.title.to_string(),
            })
            .collect();

        let rows = rows
            .iter()
            .map(|row| columns.iter().map(|c| (c.cell)(row).to_string()).collect())
            .collect();

        // A page past the end shows as the last one
        let last = meta.total_pages().max(1);
        let footer = format!(
            "Total de {} registro(s) · página {}/{}",
            meta.total,
            page.clamp(1, last),
            last
        );

        Self {
            headers,
            rows,
            footer,
            note: sort.map(|_| SORT_SCOPE_NOTE.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<width$}", c, width = *w))
                .collect::<Vec<_>>()
                .join(" | ")
        };

        writeln!(f, "{}", line(&self.headers))?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;
        if self.rows.is_empty() {
            writeln!(f, "No hay registros.")?;
        }
        for row in &self.rows {
            writeln!(f, "{}", line(row))?;
        }
        write!(f, "{}", self.footer)?;
        if let Some(note) = &self.note {
            write!(f, " ({})", note)?;
        }
        Ok(())
    }
}

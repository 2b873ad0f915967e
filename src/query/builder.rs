use mysql_async::Value;
use itertools::Itertools;
use tracing::warn;
use crate::{Identifier, Row, SortDirection, TableDescriptor, NUMERIC_PATTERN};

/// Query text plus the values bound to its `?` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    fn new(sql: String, params: Vec<Value>) -> Self {
        Self { sql, params }
    }
}

/// A filtered, sorted, paginated read of one table.
#[derive(Debug, Clone)]
pub struct ExplorerQuery {
    pub table: Identifier,
    pub columns: Vec<Identifier>,
    pub search: Option<String>,
    /// `None` selects the default ordering: first column ascending.
    pub sort: Option<Identifier>,
    pub direction: SortDirection,
    pub page: u64,
    pub limit: u64,
}

impl ExplorerQuery {
    pub fn build(
        descriptor: &TableDescriptor,
        search: Option<&str>,
        sort: Option<&str>,
        direction: SortDirection,
        page: i64,
        limit: u64,
    ) -> Self {
        let sort = sort
            .filter(|s| !s.is_empty())
            .and_then(|requested| resolve_sort_column(descriptor, requested));
        let direction = if sort.is_some() { direction } else { SortDirection::Ascending };

        Self {
            table: descriptor.name.clone(),
            columns: descriptor.columns.clone(),
            search: search.filter(|s| !s.is_empty()).map(String::from),
            sort,
            direction,
            page: page.max(0) as u64,
            limit,
        }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.limit)
    }

    /// Bound value for the LIKE predicate; wildcards typed by the user match literally.
    pub fn search_pattern(&self) -> Option<String> {
        self.search
            .as_ref()
            .map(|term| format!("%{}%", escape_like(&term.to_lowercase())))
    }

    /// The same predicate the store evaluates, for in-process filtering.
    pub fn matches(&self, row: &Row) -> bool {
        match &self.search {
            None => true,
            Some(term) => {
                let haystack = self
                    .columns
                    .iter()
                    .filter_map(|c| row.get(c.as_str()).and_then(|v| v.to_text()))
                    .join(" ")
                    .to_lowercase();
                haystack.contains(&term.to_lowercase())
            }
        }
    }

    fn where_clause(&self) -> String {
        if self.search.is_none() || self.columns.is_empty() {
            return String::new();
        }
        let concat = self.columns.iter().map(Identifier::quoted).join(", ");
        format!(
            " WHERE LOWER(CONVERT(CONCAT_WS(' ', {}) USING utf8mb4)) LIKE ?",
            concat
        )
    }

    fn order_clause(&self) -> String {
        match (&self.sort, self.columns.first()) {
            (Some(column), _) => format!(" ORDER BY {} {}", column.quoted(), self.direction.as_sql()),
            (None, Some(first)) => format!(" ORDER BY {} ASC", first.quoted()),
            (None, None) => String::new(),
        }
    }

    fn projection(&self) -> String {
        if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.iter().map(Identifier::quoted).join(", ")
        }
    }

    fn filter_params(&self) -> Vec<Value> {
        self.search_pattern().map(Value::from).into_iter().collect()
    }

    pub fn data_statement(&self) -> Statement {
        let sql = format!(
            "SELECT {} FROM {}{}{} LIMIT ? OFFSET ?",
            self.projection(),
            self.table.quoted(),
            self.where_clause(),
            self.order_clause()
        );
        let mut params = self.filter_params();
        params.push(Value::from(self.limit));
        params.push(Value::from(self.offset()));
        Statement::new(sql, params)
    }

    /// Mirrors the data statement's predicate without ordering or pagination.
    pub fn count_statement(&self) -> Statement {
        let sql = format!(
            "SELECT COUNT(*) FROM {}{}",
            self.table.quoted(),
            self.where_clause()
        );
        Statement::new(sql, self.filter_params())
    }

    pub fn statements(&self) -> (Statement, Statement) {
        (self.data_statement(), self.count_statement())
    }
}

fn resolve_sort_column(descriptor: &TableDescriptor, requested: &str) -> Option<Identifier> {
    if let Err(e) = Identifier::parse(requested) {
        warn!("Ignoring sort column: {}", e);
        return None;
    }
    let column = descriptor.column(requested).cloned();
    if column.is_none() {
        warn!(
            "Sort column {} is not a column of {}; using default ordering",
            requested, descriptor.name
        );
    }
    column
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Rows feeding a clustering run: primary feature non-null, ordered by it, capped.
#[derive(Debug, Clone)]
pub struct SampleQuery {
    pub table: Identifier,
    pub columns: Vec<Identifier>,
    /// Primary feature first.
    pub features: Vec<Identifier>,
    pub cap: u64,
}

impl SampleQuery {
    pub fn primary(&self) -> Option<&Identifier> {
        self.features.first()
    }

    pub fn statement(&self) -> Statement {
        let projection = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.iter().map(Identifier::quoted).join(", ")
        };
        let sql = match self.primary() {
            Some(primary) => format!(
                "SELECT {} FROM {} WHERE {} IS NOT NULL ORDER BY ({} + 0) ASC LIMIT ?",
                projection,
                self.table.quoted(),
                primary.quoted(),
                primary.quoted()
            ),
            None => format!("SELECT {} FROM {} LIMIT ?", projection, self.table.quoted()),
        };
        Statement::new(sql, vec![Value::from(self.cap)])
    }
}

/// Store-side numeric probe: how many values are present, how many look numeric, and
/// whether the average aggregate evaluates.
pub fn probe_statement(table: &Identifier, column: &Identifier) -> Statement {
    let c = column.quoted();
    let sql = format!(
        "SELECT COUNT({c}), COALESCE(SUM(CASE WHEN CONCAT({c}) REGEXP ? THEN 1 ELSE 0 END), 0), AVG({c}) FROM {t}",
        c = c,
        t = table.quoted()
    );
    Statement::new(sql, vec![Value::from(NUMERIC_PATTERN)])
}

/// count/min/max/mean/population stddev over the non-null values of one column.
pub fn statistic_statement(table: &Identifier, column: &Identifier) -> Statement {
    let c = column.quoted();
    let sql = format!(
        "SELECT COUNT(v), MIN(v), MAX(v), AVG(v), STDDEV_POP(v) \
         FROM (SELECT ({c} + 0) AS v FROM {t} WHERE {c} IS NOT NULL) AS observations",
        c = c,
        t = table.quoted()
    );
    Statement::new(sql, Vec::new())
}

pub fn row_count_statement(table: &Identifier) -> Statement {
    Statement::new(format!("SELECT COUNT(*) FROM {}", table.quoted()), Vec::new())
}

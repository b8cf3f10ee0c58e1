//! DeleteBuilder：构建 DELETE 语句。

use crate::builder::{BuildError, Builder, Querier};
use crate::dialect::{Dialect, default_dialect};
use crate::macros::{IntoStrings, collect_into_strings};
use crate::predicate::{Predicate, and};
use crate::table::Table;

#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    dialect: Dialect,
    table: String,
    schema: String,
    where_: Option<Predicate>,
    returning: Vec<String>,
}

/// `DELETE FROM table`，使用当前默认方言。
pub fn delete_from(table: impl Into<String>) -> DeleteBuilder {
    DeleteBuilder::new(table)
}

impl DeleteBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            dialect: default_dialect(),
            table: table.into(),
            schema: String::new(),
            where_: None,
            returning: Vec::new(),
        }
    }

    pub fn for_table<T: Table>() -> Self {
        Self::new(T::table_name())
    }

    pub fn set_dialect(&mut self, dialect: Dialect) -> Dialect {
        std::mem::replace(&mut self.dialect, dialect)
    }

    pub fn schema(&mut self, schema: impl Into<String>) -> &mut Self {
        self.schema = schema.into();
        self
    }

    /// 设置 WHERE 条件；多次调用以 AND 连接。
    pub fn where_(&mut self, pred: Predicate) -> &mut Self {
        self.where_ = Some(match self.where_.take() {
            Some(prev) => and([prev, pred]),
            None => pred,
        });
        self
    }

    pub fn returning<T>(&mut self, columns: T) -> &mut Self
    where
        T: IntoStrings,
    {
        self.returning.extend(collect_into_strings(columns));
        self
    }
}

impl Querier for DeleteBuilder {
    fn render(&self, b: &mut Builder) {
        if self.table.is_empty() {
            b.add_error(BuildError::EmptyTable);
        }
        b.write_str("DELETE FROM ");
        b.write_schema(&self.schema).ident(&self.table);
        if let Some(pred) = self.where_.as_ref().filter(|p| !p.is_empty()) {
            b.write_str(" WHERE ").join(&[pred]);
        }
        if !self.returning.is_empty() && b.dialect().supports_returning() {
            b.write_str(" RETURNING ").ident_comma(&self.returning);
        }
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }
}

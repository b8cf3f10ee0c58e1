//! InsertBuilder：构建 INSERT 语句。

use crate::builder::{BuildError, Builder, Querier};
use crate::dialect::{Dialect, default_dialect};
use crate::macros::{IntoStrings, collect_into_strings};
use crate::table::Table;
use crate::value::SqlValue;

#[derive(Debug, Clone)]
pub struct InsertBuilder {
    dialect: Dialect,
    table: String,
    schema: String,
    columns: Vec<String>,
    values: Vec<Vec<SqlValue>>,
    defaults: bool,
    returning: Vec<String>,
}

/// `INSERT INTO table`，使用当前默认方言。
pub fn insert(table: impl Into<String>) -> InsertBuilder {
    InsertBuilder::new(table)
}

impl InsertBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            dialect: default_dialect(),
            table: table.into(),
            schema: String::new(),
            columns: Vec::new(),
            values: Vec::new(),
            defaults: false,
            returning: Vec::new(),
        }
    }

    pub fn for_table<T: Table>() -> Self {
        Self::new(T::table_name())
    }

    /// 设置方言，返回旧值。
    pub fn set_dialect(&mut self, dialect: Dialect) -> Dialect {
        std::mem::replace(&mut self.dialect, dialect)
    }

    pub fn schema(&mut self, schema: impl Into<String>) -> &mut Self {
        self.schema = schema.into();
        self
    }

    pub fn columns<T>(&mut self, columns: T) -> &mut Self
    where
        T: IntoStrings,
    {
        self.columns.extend(collect_into_strings(columns));
        self
    }

    /// 追加一行值。
    pub fn values<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        self.values
            .push(values.into_iter().map(Into::into).collect());
        self
    }

    /// 追加一列以及它在第一行中的值。
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        self.columns.push(column.into());
        match self.values.first_mut() {
            Some(row) => row.push(value.into()),
            None => self.values.push(vec![value.into()]),
        }
        self
    }

    /// 未指定列时插入一行默认值：MySQL 输出 `()`，Postgres/SQLite 输出 `DEFAULT VALUES`。
    pub fn default_values(&mut self) -> &mut Self {
        self.defaults = true;
        self
    }

    /// `RETURNING` 列；MySQL 不支持，渲染时忽略。
    pub fn returning<T>(&mut self, columns: T) -> &mut Self
    where
        T: IntoStrings,
    {
        self.returning.extend(collect_into_strings(columns));
        self
    }

    fn write_defaults(&self, b: &mut Builder) {
        match b.dialect() {
            Dialect::MySQL => {
                b.write_str("()");
            }
            Dialect::Postgres | Dialect::SQLite => {
                b.write_str("DEFAULT VALUES");
            }
            Dialect::Unset => {
                b.add_error(BuildError::DefaultsWithoutDialect);
            }
        }
    }

    fn check_values(&self, b: &mut Builder) {
        if self.columns.is_empty() && self.values.is_empty() {
            b.add_error(BuildError::EmptyInsert);
            return;
        }
        let want = self.columns.len();
        for (row, values) in self.values.iter().enumerate() {
            if values.len() != want {
                b.add_error(BuildError::ValuesMismatch {
                    row,
                    got: values.len(),
                    want,
                });
            }
        }
    }
}

impl Querier for InsertBuilder {
    fn render(&self, b: &mut Builder) {
        if self.table.is_empty() {
            b.add_error(BuildError::EmptyTable);
        }
        b.write_str("INSERT INTO ");
        b.write_schema(&self.schema).ident(&self.table).pad();
        if self.defaults && self.columns.is_empty() {
            self.write_defaults(b);
        } else {
            self.check_values(b);
            b.write_char('(')
                .ident_comma(&self.columns)
                .write_char(')')
                .write_str(" VALUES ");
            for (i, row) in self.values.iter().enumerate() {
                if i > 0 {
                    b.comma();
                }
                b.write_char('(').args(row.iter().cloned()).write_char(')');
            }
        }
        if !self.returning.is_empty() && b.dialect().supports_returning() {
            b.write_str(" RETURNING ").ident_comma(&self.returning);
        }
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }
}

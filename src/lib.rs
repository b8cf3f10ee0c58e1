//! duo：按方言渲染的 SQL builder 与结果行解码库。
//!
//! builder 只产出 `(sql, args)`；解码端只依赖最小的行数据源能力 [`ColumnScanner`]。

pub mod builder;
pub mod delete;
pub mod dialect;
pub mod insert;
pub mod macros;
pub use crate::macros::*;
pub mod op;
pub mod predicate;
pub mod record;
pub mod scan;
#[cfg(test)]
mod scan_tests;
mod string_builder;
pub mod table;
pub mod value;

pub use crate::builder::{BuildError, BuildErrors, Builder, Querier};
pub use crate::delete::{DeleteBuilder, delete_from};
pub use crate::dialect::{
    DefaultDialectGuard, Dialect, ParseDialectError, default_dialect, set_default_dialect,
    set_default_dialect_scoped,
};
pub use crate::insert::{InsertBuilder, insert};
pub use crate::op::Op;
pub use crate::predicate::Predicate;
pub use crate::record::{FieldDesc, FieldPath, Record};
pub use crate::scan::{
    ColumnScanner, ConvertError, FromValue, MemoryRows, RowScan, ScanError, Scannable, scan_one,
    scan_slice, scan_value,
};
pub use crate::table::Table;
pub use crate::value::SqlValue;

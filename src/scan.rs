//! Scan：把按列组织的结果行解码为标量、`Box<T>` 或记录类型。
//!
//! 行数据源只需实现 [`ColumnScanner`]；解码规则在每次调用时根据目标类型与列名
//! 生成一次 [`RowScan`]，之后逐行复用。

use crate::macros::{IntoStrings, collect_into_strings};
use crate::value::SqlValue;
use std::any::type_name;
use std::collections::VecDeque;
use std::error::Error as StdError;

/// 单列值转换失败。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("converting {from} to {to} is unsupported")]
    Unsupported {
        from: &'static str,
        to: &'static str,
    },
    #[error("invalid {to} value {value:?}")]
    Invalid { to: &'static str, value: String },
    #[error("unknown struct field {0}")]
    UnknownField(&'static str),
}

impl ConvertError {
    fn unsupported<T>(v: &SqlValue) -> Self {
        Self::Unsupported {
            from: v.kind(),
            to: type_name::<T>(),
        }
    }

    fn invalid<T>(value: impl ToString) -> Self {
        Self::Invalid {
            to: type_name::<T>(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("sql/scan: missing column metadata")]
    NoColumns,
    #[error("sql/scan: unexpected number of columns: {0}")]
    UnexpectedColumns(usize),
    #[error("sql: no rows in result set")]
    NoRows,
    #[error("sql/scan: expect exactly one row in result set")]
    TooManyRows,
    #[error("sql/scan: columns do not match ({columns} > {dests})")]
    ColumnsMismatch { columns: usize, dests: usize },
    #[error("sql/scan: missing struct field for column: {column} ({name})")]
    MissingField { column: String, name: String },
    #[error("sql/scan: column {column}: {source}")]
    Decode {
        column: String,
        source: ConvertError,
    },
    #[error("sql/scan: failed scanning rows: {0}")]
    Scan(#[source] Box<ScanError>),
    /// 行数据源自身的错误。
    #[error("{0}")]
    Source(#[from] Box<dyn StdError + Send + Sync>),
}

impl ScanError {
    pub fn from_source(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Source(Box::new(err))
    }

    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRows)
    }
}

/// 行数据源：提供列名、逐行推进、终止错误以及把当前行写入目标槽位。
pub trait ColumnScanner {
    fn columns(&self) -> Result<Vec<String>, ScanError>;

    /// 推进到下一行；没有更多行时返回 `false`。
    fn next(&mut self) -> bool;

    /// 取出迭代结束后的终止错误。
    fn err(&mut self) -> Result<(), ScanError>;

    /// 按列顺序把当前行写入 `dest`。
    fn scan(&mut self, dest: &mut [SqlValue]) -> Result<(), ScanError>;
}

/// 可以从单个列值解码的类型。
///
/// `NILABLE` 表示该类型自身能表达 NULL（`Option<T>`、`SqlValue`、`Vec<u8>`）。
pub trait FromValue: Sized {
    const NILABLE: bool = false;

    fn from_value(v: SqlValue) -> Result<Self, ConvertError>;
}

impl FromValue for SqlValue {
    const NILABLE: bool = true;

    fn from_value(v: SqlValue) -> Result<Self, ConvertError> {
        Ok(v)
    }
}

impl FromValue for String {
    fn from_value(v: SqlValue) -> Result<Self, ConvertError> {
        match v {
            SqlValue::String(s) => Ok(s.into_owned()),
            SqlValue::Bytes(b) => {
                String::from_utf8(b).map_err(|e| ConvertError::invalid::<Self>(e))
            }
            SqlValue::I64(n) => Ok(n.to_string()),
            SqlValue::U64(n) => Ok(n.to_string()),
            SqlValue::F64(n) => Ok(n.to_string()),
            SqlValue::Bool(b) => Ok(b.to_string()),
            SqlValue::DateTime(dt) => dt
                .format(&time::format_description::well_known::Rfc3339)
                .map_err(|e| ConvertError::invalid::<Self>(e)),
            SqlValue::Null => Err(ConvertError::unsupported::<Self>(&v)),
        }
    }
}

macro_rules! from_value_int {
    ($($t:ty),+ $(,)?) => {
        $(impl FromValue for $t {
            fn from_value(v: SqlValue) -> Result<Self, ConvertError> {
                match v {
                    SqlValue::I64(n) => <$t>::try_from(n).map_err(|_| ConvertError::invalid::<Self>(n)),
                    SqlValue::U64(n) => <$t>::try_from(n).map_err(|_| ConvertError::invalid::<Self>(n)),
                    SqlValue::String(ref s) => s
                        .trim()
                        .parse::<$t>()
                        .map_err(|_| ConvertError::invalid::<Self>(s)),
                    _ => Err(ConvertError::unsupported::<Self>(&v)),
                }
            }
        })+
    };
}

from_value_int!(i8, i16, i32, i64, u8, u16, u32, u64);

macro_rules! from_value_float {
    ($($t:ty),+ $(,)?) => {
        $(impl FromValue for $t {
            fn from_value(v: SqlValue) -> Result<Self, ConvertError> {
                match v {
                    SqlValue::F64(n) => Ok(n as $t),
                    SqlValue::I64(n) => Ok(n as $t),
                    SqlValue::U64(n) => Ok(n as $t),
                    SqlValue::String(ref s) => s
                        .trim()
                        .parse::<$t>()
                        .map_err(|_| ConvertError::invalid::<Self>(s)),
                    _ => Err(ConvertError::unsupported::<Self>(&v)),
                }
            }
        })+
    };
}

from_value_float!(f32, f64);

impl FromValue for bool {
    fn from_value(v: SqlValue) -> Result<Self, ConvertError> {
        match v {
            SqlValue::Bool(b) => Ok(b),
            SqlValue::I64(0) | SqlValue::U64(0) => Ok(false),
            SqlValue::I64(1) | SqlValue::U64(1) => Ok(true),
            SqlValue::I64(n) => Err(ConvertError::invalid::<Self>(n)),
            SqlValue::U64(n) => Err(ConvertError::invalid::<Self>(n)),
            SqlValue::String(ref s) => match s.as_ref() {
                "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
                "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
                _ => Err(ConvertError::invalid::<Self>(s)),
            },
            _ => Err(ConvertError::unsupported::<Self>(&v)),
        }
    }
}

impl FromValue for Vec<u8> {
    const NILABLE: bool = true;

    fn from_value(v: SqlValue) -> Result<Self, ConvertError> {
        match v {
            SqlValue::Null => Ok(Vec::new()),
            SqlValue::Bytes(b) => Ok(b),
            SqlValue::String(s) => Ok(s.into_owned().into_bytes()),
            _ => Err(ConvertError::unsupported::<Self>(&v)),
        }
    }
}

impl FromValue for time::OffsetDateTime {
    fn from_value(v: SqlValue) -> Result<Self, ConvertError> {
        match v {
            SqlValue::DateTime(dt) => Ok(dt),
            SqlValue::String(ref s) => {
                time::OffsetDateTime::parse(s, &time::format_description::well_known::Rfc3339)
                    .map_err(|_| ConvertError::invalid::<Self>(s))
            }
            _ => Err(ConvertError::unsupported::<Self>(&v)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const NILABLE: bool = true;

    fn from_value(v: SqlValue) -> Result<Self, ConvertError> {
        if v.is_null() {
            return Ok(None);
        }
        T::from_value(v).map(Some)
    }
}

/// 一个目标槽位：对应的列名，以及该槽位能否直接容纳 NULL。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSlot {
    pub column: String,
    pub nilable: bool,
}

type Materializer<T> = Box<dyn Fn(Vec<SqlValue>) -> Result<T, ScanError>>;

/// 一次解码调用内复用的行扫描描述：槽位列表 + 把一行原始值组装为 `T` 的函数。
pub struct RowScan<T> {
    columns: Vec<ColumnSlot>,
    value: Materializer<T>,
}

impl<T: 'static> RowScan<T> {
    pub fn new(
        columns: Vec<ColumnSlot>,
        value: impl Fn(Vec<SqlValue>) -> Result<T, ScanError> + 'static,
    ) -> Self {
        Self {
            columns,
            value: Box::new(value),
        }
    }

    pub fn columns(&self) -> &[ColumnSlot] {
        &self.columns
    }

    /// 为一行分配空的目标槽位。
    pub fn values(&self) -> Vec<SqlValue> {
        vec![SqlValue::Null; self.columns.len()]
    }

    pub fn value(&self, values: Vec<SqlValue>) -> Result<T, ScanError> {
        (self.value)(values)
    }

    fn map<U: 'static>(self, f: fn(T) -> U) -> RowScan<U> {
        let value = self.value;
        RowScan::new(self.columns, move |vs| value(vs).map(f))
    }
}

impl<T> std::fmt::Debug for RowScan<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowScan")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

/// 可以作为 `scan_slice` 目标的类型。
///
/// - 标量（实现了 [`FromValue`] 的类型及其 `Option`）：单列，值原样解码；
/// - `Box<T>`：先按 `T` 解码再装箱；
/// - 记录：由 [`scan_struct!`](crate::scan_struct) 生成，按列名映射字段。
pub trait Scannable: Sized + 'static {
    fn scan_type(columns: &[String]) -> Result<RowScan<Self>, ScanError>;
}

/// 单列标量的扫描描述。
pub fn scan_value_type<T: FromValue + 'static>(columns: &[String]) -> RowScan<T> {
    let column = columns.first().cloned().unwrap_or_default();
    let slot = ColumnSlot {
        column: column.clone(),
        nilable: T::NILABLE,
    };
    RowScan::new(vec![slot], move |values| {
        let v = values.into_iter().next().unwrap_or_default();
        T::from_value(v).map_err(|source| ScanError::Decode {
            column: column.clone(),
            source,
        })
    })
}

macro_rules! scannable_value {
    ($($t:ty),+ $(,)?) => {
        $(impl Scannable for $t {
            fn scan_type(columns: &[String]) -> Result<RowScan<Self>, ScanError> {
                Ok(scan_value_type::<Self>(columns))
            }
        })+
    };
}

scannable_value!(
    SqlValue,
    String,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    bool,
    Vec<u8>,
    time::OffsetDateTime,
);

impl<T: FromValue + 'static> Scannable for Option<T> {
    fn scan_type(columns: &[String]) -> Result<RowScan<Self>, ScanError> {
        Ok(scan_value_type::<Self>(columns))
    }
}

impl<T: Scannable> Scannable for Box<T> {
    fn scan_type(columns: &[String]) -> Result<RowScan<Self>, ScanError> {
        Ok(T::scan_type(columns)?.map(Box::new))
    }
}

/// 读取恰好一行、一列的结果。
///
/// 列数不为 1 返回 `UnexpectedColumns`，没有行返回 `NoRows`，多于一行返回 `TooManyRows`。
pub fn scan_one<T, R>(rows: &mut R) -> Result<T, ScanError>
where
    T: FromValue,
    R: ColumnScanner + ?Sized,
{
    let columns = rows.columns()?;
    if columns.len() != 1 {
        return Err(ScanError::UnexpectedColumns(columns.len()));
    }
    if !rows.next() {
        rows.err()?;
        return Err(ScanError::NoRows);
    }
    let mut dest = [SqlValue::Null];
    rows.scan(&mut dest)?;
    let [value] = dest;
    let v = T::from_value(value).map_err(|source| ScanError::Decode {
        column: columns[0].clone(),
        source,
    })?;
    if rows.next() {
        return Err(ScanError::TooManyRows);
    }
    Ok(v)
}

/// 读取单个值，不做类型转换。
pub fn scan_value<R: ColumnScanner + ?Sized>(rows: &mut R) -> Result<SqlValue, ScanError> {
    scan_one(rows)
}

/// 读取全部行。迭代结束后返回数据源的终止错误（如果有）。
pub fn scan_slice<T, R>(rows: &mut R) -> Result<Vec<T>, ScanError>
where
    T: Scannable,
    R: ColumnScanner + ?Sized,
{
    let columns = rows.columns()?;
    if columns.is_empty() {
        return Err(ScanError::NoColumns);
    }
    let scan = T::scan_type(&columns)?;
    let (n, m) = (columns.len(), scan.columns().len());
    if n > m {
        return Err(ScanError::ColumnsMismatch {
            columns: n,
            dests: m,
        });
    }

    let mut res = Vec::new();
    while rows.next() {
        let mut values = scan.values();
        rows.scan(&mut values)
            .map_err(|e| ScanError::Scan(Box::new(e)))?;
        res.push(scan.value(values)?);
    }
    rows.err()?;
    Ok(res)
}

/// 内存中的行数据源，适用于已经取回的结果或测试。
#[derive(Debug, Clone, Default)]
pub struct MemoryRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<SqlValue>>,
    current: Option<Vec<SqlValue>>,
    err: Option<String>,
}

impl MemoryRows {
    pub fn new<T: IntoStrings>(columns: T) -> Self {
        Self {
            columns: collect_into_strings(columns),
            ..Self::default()
        }
    }

    pub fn add_row<I, V>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        self.rows.push_back(row.into_iter().map(Into::into).collect());
        self
    }

    /// 所有行读完后由 `err()` 返回的终止错误。
    pub fn with_error(mut self, msg: impl Into<String>) -> Self {
        self.err = Some(msg.into());
        self
    }
}

impl ColumnScanner for MemoryRows {
    fn columns(&self) -> Result<Vec<String>, ScanError> {
        Ok(self.columns.clone())
    }

    fn next(&mut self) -> bool {
        self.current = self.rows.pop_front();
        self.current.is_some()
    }

    fn err(&mut self) -> Result<(), ScanError> {
        match self.err.take() {
            Some(msg) => Err(ScanError::Source(msg.into())),
            None => Ok(()),
        }
    }

    fn scan(&mut self, dest: &mut [SqlValue]) -> Result<(), ScanError> {
        let Some(row) = &self.current else {
            return Err(ScanError::Source("sql: Scan called without calling Next".into()));
        };
        if dest.len() != row.len() {
            return Err(ScanError::Source(
                format!(
                    "sql: expected {} destination arguments in Scan, not {}",
                    row.len(),
                    dest.len()
                )
                .into(),
            ));
        }
        dest.clone_from_slice(row);
        Ok(())
    }
}

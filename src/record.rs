//! 记录类型的列映射。
//!
//! 通过 [`scan_struct!`](crate::scan_struct) 为结构体生成静态字段描述，
//! 扫描时按列名（大小写不敏感，忽略 `(` 之后的部分）匹配字段。

use crate::scan::{ColumnSlot, ConvertError, FromValue, RowScan, ScanError};
use crate::value::SqlValue;
use std::collections::HashMap;

/// 字段描述。`embedded` 非空表示该字段是内嵌记录，它的字段会提升到外层。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDesc {
    pub rust: &'static str,
    pub sql: Option<&'static str>,
    pub json: Option<&'static str>,
    pub nilable: bool,
    pub embedded: Option<&'static [FieldDesc]>,
}

impl FieldDesc {
    /// 列名：`sql` 标签优先，其次是 `json` 标签逗号前的部分，最后是小写的字段名。
    pub fn column_name(&self) -> String {
        if let Some(sql) = self.sql {
            return sql.to_string();
        }
        if let Some(json) = self.json {
            return json.split(',').next().unwrap_or_default().to_string();
        }
        self.rust.to_lowercase()
    }
}

/// 指向一个字段；`inner` 用于内嵌记录中的字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldPath {
    pub field: &'static str,
    pub inner: Option<&'static str>,
}

impl FieldPath {
    pub fn direct(field: &'static str) -> Self {
        Self { field, inner: None }
    }
}

pub trait Record: Default + 'static {
    const FIELDS: &'static [FieldDesc];

    fn assign(&mut self, path: &FieldPath, value: SqlValue) -> Result<(), ConvertError>;
}

#[doc(hidden)]
pub fn assign_value<T: FromValue>(dst: &mut T, value: SqlValue) -> Result<(), ConvertError> {
    *dst = T::from_value(value)?;
    Ok(())
}

/// 列名规范化：取 `(` 之前的部分并转小写，`COUNT(*)` 对应 `count`。
pub fn normalize_column(column: &str) -> String {
    column
        .split('(')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

// 直接字段优先于内嵌记录提升上来的同名字段。
fn field_table<T: Record>() -> HashMap<String, (FieldPath, bool)> {
    let mut names = HashMap::new();
    for f in T::FIELDS {
        let Some(inner) = f.embedded else {
            names.insert(f.column_name(), (FieldPath::direct(f.rust), f.nilable));
            continue;
        };
        // 只提升一层
        for g in inner.iter().filter(|g| g.embedded.is_none()) {
            let path = FieldPath {
                field: f.rust,
                inner: Some(g.rust),
            };
            names.entry(g.column_name()).or_insert((path, g.nilable));
        }
    }
    names
}

/// 为记录类型生成扫描描述。任何一列找不到对应字段都会失败。
///
/// NULL 值不会写入字段，字段保持默认值。
pub fn scan_record<T: Record>(columns: &[String]) -> Result<RowScan<T>, ScanError> {
    let names = field_table::<T>();
    let mut paths = Vec::with_capacity(columns.len());
    let mut slots = Vec::with_capacity(columns.len());
    for column in columns {
        let name = normalize_column(column);
        let Some(&(path, nilable)) = names.get(&name) else {
            tracing::debug!(column = %column, name = %name, "no struct field for column");
            return Err(ScanError::MissingField {
                column: column.clone(),
                name,
            });
        };
        paths.push(path);
        slots.push(ColumnSlot {
            column: column.clone(),
            nilable,
        });
    }

    let columns = columns.to_vec();
    Ok(RowScan::new(slots, move |values| {
        let mut rec = T::default();
        for ((value, path), column) in values.into_iter().zip(&paths).zip(&columns) {
            if value.is_null() {
                continue;
            }
            rec.assign(path, value)
                .map_err(|source| ScanError::Decode {
                    column: column.clone(),
                    source,
                })?;
        }
        Ok(rec)
    }))
}

/// 为结构体生成 [`Record`] 与 [`Scannable`](crate::scan::Scannable) 实现。
///
/// ```ignore
/// scan_struct! {
///     impl User {
///         name: String { sql: None, json: None },
///         age: i64 { sql: Some("user_age"), json: None },
///     }
///     embed {
///         base: Base,
///     }
/// }
/// ```
#[macro_export]
macro_rules! scan_struct {
    (
        impl $st:ty {
            $( $field:ident : $fty:ty { sql: $sql:expr, json: $json:expr } ),* $(,)?
        }
        $( embed { $( $efield:ident : $ety:ty ),* $(,)? } )?
    ) => {
        impl $crate::record::Record for $st {
            const FIELDS: &'static [$crate::record::FieldDesc] = &[
                $(
                    $crate::record::FieldDesc {
                        rust: stringify!($field),
                        sql: $sql,
                        json: $json,
                        nilable: <$fty as $crate::scan::FromValue>::NILABLE,
                        embedded: None,
                    },
                )*
                $($(
                    $crate::record::FieldDesc {
                        rust: stringify!($efield),
                        sql: None,
                        json: None,
                        nilable: false,
                        embedded: Some(<$ety as $crate::record::Record>::FIELDS),
                    },
                )*)?
            ];

            fn assign(
                &mut self,
                path: &$crate::record::FieldPath,
                value: $crate::value::SqlValue,
            ) -> Result<(), $crate::scan::ConvertError> {
                match (path.field, path.inner) {
                    $(
                        (stringify!($field), None) => {
                            $crate::record::assign_value(&mut self.$field, value)
                        }
                    )*
                    $($(
                        (stringify!($efield), Some(inner)) => $crate::record::Record::assign(
                            &mut self.$efield,
                            &$crate::record::FieldPath::direct(inner),
                            value,
                        ),
                    )*)?
                    _ => Err($crate::scan::ConvertError::UnknownField(path.field)),
                }
            }
        }

        impl $crate::scan::Scannable for $st {
            fn scan_type(
                columns: &[String],
            ) -> Result<$crate::scan::RowScan<Self>, $crate::scan::ScanError> {
                $crate::record::scan_record::<Self>(columns)
            }
        }
    };
}

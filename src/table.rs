//! Table：把类型绑定到物理表名。

/// 声明自身对应的表名，供 `InsertBuilder::for_table` / `DeleteBuilder::for_table` 使用。
pub trait Table {
    fn table_name() -> &'static str;
}

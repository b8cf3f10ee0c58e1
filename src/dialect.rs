//! Dialect（方言）：控制标识符引号、占位符以及部分子句的写法。

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard};

/// 目标数据库方言。未设置时（`Unset`）按 MySQL 风格输出 `?` 与反引号。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    #[default]
    Unset,
    MySQL,
    SQLite,
    Postgres,
}

static DEFAULT_DIALECT: AtomicU8 = AtomicU8::new(Dialect::Unset as u8);
static DEFAULT_DIALECT_LOCK: Mutex<()> = Mutex::new(());

impl Dialect {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::MySQL,
            2 => Self::SQLite,
            3 => Self::Postgres,
            _ => Self::Unset,
        }
    }

    fn to_u8(self) -> u8 {
        self as u8
    }

    /// 标识符使用的引号字符。只有 Postgres 使用双引号。
    pub fn quote_char(self) -> char {
        match self {
            Self::Postgres => '"',
            Self::Unset | Self::MySQL | Self::SQLite => '`',
        }
    }

    pub fn is_postgres(self) -> bool {
        self == Self::Postgres
    }

    pub fn is_mysql(self) -> bool {
        self == Self::MySQL
    }

    /// 是否支持 `RETURNING` 子句（MySQL 不支持）。
    pub fn supports_returning(self) -> bool {
        !self.is_mysql()
    }

    /// 是否支持 `schema.table` 形式的限定名（SQLite 没有 schema 概念）。
    pub fn supports_schema(self) -> bool {
        self != Self::SQLite
    }

    /// 写入第 `n` 个占位符（从 1 开始计数）。
    pub(crate) fn write_placeholder(self, n: usize, out: &mut String) {
        match self {
            Self::Postgres => {
                out.push('$');
                out.push_str(&n.to_string());
            }
            Self::Unset | Self::MySQL | Self::SQLite => out.push('?'),
        }
    }
}

/// 获取当前全局默认 Dialect。
pub fn default_dialect() -> Dialect {
    Dialect::from_u8(DEFAULT_DIALECT.load(Ordering::Relaxed))
}

/// 设置全局默认 Dialect，返回旧值。
pub fn set_default_dialect(dialect: Dialect) -> Dialect {
    let old = DEFAULT_DIALECT.swap(dialect.to_u8(), Ordering::Relaxed);
    Dialect::from_u8(old)
}

/// 修改全局默认 Dialect 的 RAII guard（持有全局锁，避免并行测试互相干扰）。
pub struct DefaultDialectGuard {
    _lock: MutexGuard<'static, ()>,
    old: Dialect,
}

impl Drop for DefaultDialectGuard {
    fn drop(&mut self) {
        set_default_dialect(self.old);
    }
}

/// 在一个作用域内临时设置默认 Dialect，退出作用域后自动恢复。
pub fn set_default_dialect_scoped(dialect: Dialect) -> DefaultDialectGuard {
    let lock = DEFAULT_DIALECT_LOCK
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    let old = set_default_dialect(dialect);
    DefaultDialectGuard { _lock: lock, old }
}

/// 输出驱动名（与 `database/sql` 的驱动注册名一致）。
impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unset => "",
            Self::MySQL => "mysql",
            Self::SQLite => "sqlite3",
            Self::Postgres => "postgres",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("sql: unknown dialect {0:?}")]
pub struct ParseDialectError(pub String);

impl FromStr for Dialect {
    type Err = ParseDialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(Self::Unset),
            "mysql" => Ok(Self::MySQL),
            "sqlite" | "sqlite3" => Ok(Self::SQLite),
            "postgres" | "postgresql" | "pgx" => Ok(Self::Postgres),
            _ => Err(ParseDialectError(s.to_string())),
        }
    }
}

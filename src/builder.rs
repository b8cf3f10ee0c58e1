//! Builder：SQL 文本与参数的累积器，负责按方言 quote 标识符、输出占位符与运算符。
//!
//! 所有语句构建器与谓词最终都通过 `Builder` 写出 `(sql, args)`。

use crate::dialect::{Dialect, default_dialect};
use crate::op::Op;
use crate::string_builder::StringBuilder;
use crate::value::SqlValue;
use dyn_clone::DynClone;

/// 构建过程中累积的错误，不会打断链式调用。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("sql: missing table name")]
    EmptyTable,
    #[error("sql: empty column name in predicate")]
    EmptyColumn,
    #[error("sql/insert: row {row} has {got} values, expect {want}")]
    ValuesMismatch { row: usize, got: usize, want: usize },
    #[error("sql/insert: missing columns and values")]
    EmptyInsert,
    #[error("sql/insert: default values need a dialect")]
    DefaultsWithoutDialect,
    #[error("{0}")]
    Message(String),
}

impl From<String> for BuildError {
    fn from(v: String) -> Self {
        Self::Message(v)
    }
}

impl From<&str> for BuildError {
    fn from(v: &str) -> Self {
        Self::Message(v.to_string())
    }
}

/// 聚合错误：所有消息以 `; ` 连接。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_messages(.0))]
pub struct BuildErrors(pub Vec<BuildError>);

impl BuildErrors {
    pub fn errors(&self) -> &[BuildError] {
        &self.0
    }
}

fn join_messages(errs: &[BuildError]) -> String {
    errs.iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// 可以渲染进 `Builder` 的 SQL 片段（语句、谓词或闭包）。
///
/// `join` / `nested` 时，片段渲染在一个继承了方言、占位符计数与限定名的子 builder 中，
/// 因此 Postgres 的 `$N` 编号在整条语句内保持连续。
pub trait Querier: DynClone {
    fn render(&self, b: &mut Builder);

    fn dialect(&self) -> Dialect {
        default_dialect()
    }

    fn build(&self) -> Builder {
        self.build_with_dialect(self.dialect())
    }

    fn build_with_dialect(&self, dialect: Dialect) -> Builder {
        let mut b = Builder::new(dialect);
        self.render(&mut b);
        tracing::trace!(
            dialect = %dialect,
            sql = b.as_str(),
            args = b.args.len(),
            errors = b.errs.len(),
            "rendered sql"
        );
        b
    }

    fn query(&self) -> (String, Vec<SqlValue>) {
        self.build().into_query()
    }

    fn query_with_dialect(&self, dialect: Dialect) -> (String, Vec<SqlValue>) {
        self.build_with_dialect(dialect).into_query()
    }

    /// 与 `query` 相同，但在累积了错误时返回 `Err`。
    fn try_query(&self) -> Result<(String, Vec<SqlValue>), BuildErrors> {
        self.build().try_into_query()
    }
}

dyn_clone::clone_trait_object!(Querier);

impl<F> Querier for F
where
    F: Fn(&mut Builder) + Clone,
{
    fn render(&self, b: &mut Builder) {
        self(b)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Builder {
    sb: StringBuilder,
    dialect: Dialect,
    args: Vec<SqlValue>,
    total: usize,
    errs: Vec<BuildError>,
    qualifier: Option<String>,
}

impl Builder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            sb: StringBuilder::new(),
            dialect,
            ..Self::default()
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// 已输出的占位符总数（包含 join/nested 合并进来的部分）。
    pub fn total(&self) -> usize {
        self.total
    }

    /// 设置表别名，之后 `ident` 写出的标识符都会带上 `alias.` 前缀。
    pub fn qualify(&mut self, alias: impl Into<String>) -> &mut Self {
        let alias = alias.into();
        self.qualifier = if alias.is_empty() { None } else { Some(alias) };
        self
    }

    /// 按方言为标识符加引号。
    pub fn quote(&self, ident: &str) -> String {
        match self.dialect {
            Dialect::Postgres if ident.contains('`') => return ident.replace('`', "\""),
            Dialect::Unset if ident.contains(['`', '"']) => return ident.to_string(),
            _ => {}
        }
        let q = self.dialect.quote_char();
        format!("{q}{ident}{q}")
    }

    /// 写入标识符。`*`、已带引号的标识符、函数调用与 `DISTINCT`/`ALL`/`WITH ROLLUP`
    /// 修饰符原样输出（Postgres 下反引号替换为双引号）。
    pub fn ident(&mut self, s: &str) -> &mut Self {
        if s.is_empty() {
            return self;
        }
        let verbatim = is_func(s) || is_modifier(s);
        if s != "*" && !self.is_quoted(s) && !verbatim {
            if let Some(prefix) = self.qualifier.as_deref().map(|q| self.quote(q)) {
                self.write_str(&prefix).write_char('.');
            }
            let quoted = self.quote(s);
            self.write_str(&quoted)
        } else if verbatim && self.dialect.is_postgres() {
            self.write_str(&s.replace('`', "\""))
        } else {
            self.write_str(s)
        }
    }

    pub fn ident_comma<I, S>(&mut self, idents: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (i, s) in idents.into_iter().enumerate() {
            if i > 0 {
                self.comma();
            }
            self.ident(s.as_ref());
        }
        self
    }

    /// 追加一个参数并写入对应的占位符。
    pub fn arg(&mut self, value: impl Into<SqlValue>) -> &mut Self {
        self.total += 1;
        self.args.push(value.into());
        self.sb.write_placeholder(self.dialect, self.total);
        self
    }

    pub fn args<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        for (i, v) in values.into_iter().enumerate() {
            if i > 0 {
                self.comma();
            }
            self.arg(v);
        }
        self
    }

    pub fn comma(&mut self) -> &mut Self {
        self.write_str(", ")
    }

    pub fn pad(&mut self) -> &mut Self {
        self.write_char(' ')
    }

    pub fn write_str(&mut self, s: &str) -> &mut Self {
        self.sb.write_str(s);
        self
    }

    pub fn write_char(&mut self, c: char) -> &mut Self {
        self.sb.write_char(c);
        self
    }

    /// 写入运算符：二元运算符两侧各补一个空格，`IS NULL`/`IS NOT NULL` 只补前导空格。
    pub fn write_op(&mut self, op: Op) -> &mut Self {
        self.pad().write_str(op.as_str());
        if !op.is_suffix() {
            self.pad();
        }
        self
    }

    /// 按数值编码写入运算符。
    ///
    /// # Panics
    ///
    /// 编码不属于 [`Op`] 时 panic。
    pub fn write_op_code(&mut self, code: u8) -> &mut Self {
        self.write_op(Op::from_code(code))
    }

    /// 依次渲染 `queriers`，合并其文本、参数、占位符计数与错误。
    pub fn join(&mut self, queriers: &[&dyn Querier]) -> &mut Self {
        self.join_sep(queriers, "")
    }

    /// 同 `join`，片段之间以 `, ` 分隔。
    pub fn join_comma(&mut self, queriers: &[&dyn Querier]) -> &mut Self {
        self.join_sep(queriers, ", ")
    }

    fn join_sep(&mut self, queriers: &[&dyn Querier], sep: &str) -> &mut Self {
        for (i, q) in queriers.iter().enumerate() {
            if i > 0 {
                self.write_str(sep);
            }
            let mut child = self.child();
            q.render(&mut child);
            self.merge(child);
        }
        self
    }

    /// 在独立的子 builder 中执行 `f`，结果以括号包裹后合并回来。
    pub fn nested(&mut self, f: impl FnOnce(&mut Builder)) -> &mut Self {
        let mut child = self.child();
        f(&mut child);
        self.write_char('(');
        self.merge(child);
        self.write_char(')')
    }

    fn child(&self) -> Builder {
        Builder {
            sb: StringBuilder::new(),
            dialect: self.dialect,
            args: Vec::new(),
            total: self.total,
            errs: Vec::new(),
            qualifier: self.qualifier.clone(),
        }
    }

    fn merge(&mut self, child: Builder) {
        self.sb.write_str(child.sb.as_str());
        self.args.extend(child.args);
        self.total = child.total;
        self.errs.extend(child.errs);
    }

    pub(crate) fn write_schema(&mut self, schema: &str) -> &mut Self {
        if !schema.is_empty() && self.dialect.supports_schema() {
            self.ident(schema).write_char('.');
        }
        self
    }

    pub fn add_error(&mut self, err: impl Into<BuildError>) -> &mut Self {
        let err = err.into();
        tracing::debug!(error = %err, "sql builder error recorded");
        self.errs.push(err);
        self
    }

    /// 返回累积的全部错误；没有错误时返回 `Ok(())`。
    pub fn err(&self) -> Result<(), BuildErrors> {
        if self.errs.is_empty() {
            Ok(())
        } else {
            Err(BuildErrors(self.errs.clone()))
        }
    }

    pub fn as_str(&self) -> &str {
        self.sb.as_str()
    }

    pub fn string(&self) -> String {
        self.sb.as_str().to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.sb.is_empty()
    }

    pub fn arg_values(&self) -> &[SqlValue] {
        &self.args
    }

    pub fn query(&self) -> (String, Vec<SqlValue>) {
        (self.string(), self.args.clone())
    }

    pub fn into_query(self) -> (String, Vec<SqlValue>) {
        (self.sb.into_string(), self.args)
    }

    pub fn try_into_query(self) -> Result<(String, Vec<SqlValue>), BuildErrors> {
        self.err()?;
        Ok(self.into_query())
    }

    fn is_quoted(&self, s: &str) -> bool {
        if self.dialect.is_postgres() {
            s.contains('"')
        } else {
            s.contains('`')
        }
    }
}

fn is_func(s: &str) -> bool {
    s.contains('(') && s.contains(')')
}

fn is_modifier(s: &str) -> bool {
    ["DISTINCT", "ALL", "WITH ROLLUP"]
        .iter()
        .any(|m| s.starts_with(m))
}

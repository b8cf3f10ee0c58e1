//! Predicate：延迟渲染的布尔表达式树。
//!
//! 谓词在组合时只记录节点，渲染发生在 `query()` 或被 `join` 进其它 builder 时，
//! 因此方言与占位符偏移都由目标 `Builder` 提供。
//!
//! 括号规则：
//! - `and`/`or` 只有一个子谓词时完全透明，不加括号；
//! - 多个子谓词位于顶层（depth 为 0）时不加外层括号，嵌套时加一对；
//! - 含多个节点的子谓词（例如 `p().eq(..).or().eq(..)`）总是单独加括号。

use crate::builder::{BuildError, Builder, Querier};
use crate::op::Op;
use crate::value::SqlValue;
use std::fmt;

#[derive(Clone)]
enum Node {
    Compare {
        column: String,
        op: Op,
        value: SqlValue,
    },
    Columns {
        left: String,
        op: Op,
        right: String,
    },
    Null {
        column: String,
        op: Op,
    },
    In {
        column: String,
        op: Op,
        values: Vec<SqlValue>,
    },
    InQuery {
        column: String,
        op: Op,
        query: Box<dyn Querier>,
    },
    Not(Predicate),
    Literal(&'static str),
    Connective(&'static str),
    Group {
        sep: &'static str,
        preds: Vec<Predicate>,
    },
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { column, op, value } => f
                .debug_struct("Compare")
                .field("column", column)
                .field("op", op)
                .field("value", value)
                .finish(),
            Self::Columns { left, op, right } => f
                .debug_struct("Columns")
                .field("left", left)
                .field("op", op)
                .field("right", right)
                .finish(),
            Self::Null { column, op } => f
                .debug_struct("Null")
                .field("column", column)
                .field("op", op)
                .finish(),
            Self::In { column, op, values } => f
                .debug_struct("In")
                .field("column", column)
                .field("op", op)
                .field("values", values)
                .finish(),
            Self::InQuery { column, op, .. } => f
                .debug_struct("InQuery")
                .field("column", column)
                .field("op", op)
                .finish_non_exhaustive(),
            Self::Not(p) => f.debug_tuple("Not").field(p).finish(),
            Self::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            Self::Connective(s) => f.debug_tuple("Connective").field(s).finish(),
            Self::Group { sep, preds } => f
                .debug_struct("Group")
                .field("sep", sep)
                .field("preds", preds)
                .finish(),
        }
    }
}

impl Node {
    fn render(&self, b: &mut Builder, depth: usize) {
        match self {
            Self::Compare { column, op, value } => {
                if check_column(b, column) {
                    b.ident(column).write_op(*op).arg(value.clone());
                }
            }
            Self::Columns { left, op, right } => {
                if check_column(b, left) && check_column(b, right) {
                    b.ident(left).write_op(*op).ident(right);
                }
            }
            Self::Null { column, op } => {
                if check_column(b, column) {
                    b.ident(column).write_op(*op);
                }
            }
            Self::In { column, op, values } => {
                if !check_column(b, column) {
                    return;
                }
                if values.is_empty() {
                    // 空列表：IN 恒假，NOT IN 恒真
                    b.write_str(if *op == Op::In { "0 = 1" } else { "0 = 0" });
                    return;
                }
                b.ident(column).write_op(*op).nested(|b| {
                    b.args(values.iter().cloned());
                });
            }
            Self::InQuery { column, op, query } => {
                if check_column(b, column) {
                    b.ident(column)
                        .write_op(*op)
                        .nested(|b| query.render(b));
                }
            }
            Self::Not(p) => {
                b.write_str("NOT ").nested(|b| p.render_at(b, 0));
            }
            Self::Literal(s) | Self::Connective(s) => {
                b.write_str(s);
            }
            Self::Group { sep, preds } => render_group(b, depth, preds, sep),
        }
    }
}

fn check_column(b: &mut Builder, column: &str) -> bool {
    if column.is_empty() {
        b.add_error(BuildError::EmptyColumn);
        return false;
    }
    true
}

fn render_group(b: &mut Builder, depth: usize, preds: &[Predicate], sep: &str) {
    match preds {
        [] => return,
        [only] => return only.render_at(b, depth),
        _ => {}
    }
    let wrap = depth != 0;
    if wrap {
        b.write_char('(');
    }
    for (i, p) in preds.iter().filter(|p| !p.is_empty()).enumerate() {
        if i > 0 {
            b.pad().write_str(sep).pad();
        }
        if p.nodes.len() > 1 {
            b.nested(|b| p.render_at(b, depth + 1));
        } else {
            p.render_at(b, depth + 1);
        }
    }
    if wrap {
        b.write_char(')');
    }
}

/// 可组合的布尔表达式。
#[derive(Debug, Clone, Default)]
pub struct Predicate {
    depth: usize,
    nodes: Vec<Node>,
}

/// 空谓词，用于链式追加：`p().eq("a", 1).or().eq("b", 2)`。
pub fn p() -> Predicate {
    Predicate::default()
}

impl Predicate {
    fn push(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    fn compare(self, column: &str, op: Op, value: impl Into<SqlValue>) -> Self {
        self.push(Node::Compare {
            column: column.to_string(),
            op,
            value: value.into(),
        })
    }

    fn columns(self, left: &str, op: Op, right: &str) -> Self {
        self.push(Node::Columns {
            left: left.to_string(),
            op,
            right: right.to_string(),
        })
    }

    fn list<I, V>(self, column: &str, op: Op, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        self.push(Node::In {
            column: column.to_string(),
            op,
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// 以指定深度渲染；非零深度会让多成员的 `and`/`or` 组带上括号。
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// 节点数量。多于一个节点的谓词在组合时会被单独加括号。
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn eq(self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.compare(column, Op::Eq, value)
    }

    pub fn neq(self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.compare(column, Op::Neq, value)
    }

    pub fn gt(self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.compare(column, Op::Gt, value)
    }

    pub fn gte(self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.compare(column, Op::Gte, value)
    }

    pub fn lt(self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.compare(column, Op::Lt, value)
    }

    pub fn lte(self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.compare(column, Op::Lte, value)
    }

    pub fn like(self, column: &str, pattern: impl Into<SqlValue>) -> Self {
        self.compare(column, Op::Like, pattern)
    }

    pub fn in_values<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        self.list(column, Op::In, values)
    }

    pub fn not_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        self.list(column, Op::NotIn, values)
    }

    /// `column IN (<子查询>)`，子查询与外层共享占位符编号。
    pub fn in_query(self, column: &str, query: impl Querier + 'static) -> Self {
        self.push(Node::InQuery {
            column: column.to_string(),
            op: Op::In,
            query: Box::new(query),
        })
    }

    pub fn not_in_query(self, column: &str, query: impl Querier + 'static) -> Self {
        self.push(Node::InQuery {
            column: column.to_string(),
            op: Op::NotIn,
            query: Box::new(query),
        })
    }

    pub fn is_null(self, column: &str) -> Self {
        self.push(Node::Null {
            column: column.to_string(),
            op: Op::IsNull,
        })
    }

    pub fn not_null(self, column: &str) -> Self {
        self.push(Node::Null {
            column: column.to_string(),
            op: Op::NotNull,
        })
    }

    pub fn col_eq(self, left: &str, right: &str) -> Self {
        self.columns(left, Op::Eq, right)
    }

    pub fn col_neq(self, left: &str, right: &str) -> Self {
        self.columns(left, Op::Neq, right)
    }

    pub fn col_gt(self, left: &str, right: &str) -> Self {
        self.columns(left, Op::Gt, right)
    }

    pub fn col_gte(self, left: &str, right: &str) -> Self {
        self.columns(left, Op::Gte, right)
    }

    pub fn col_lt(self, left: &str, right: &str) -> Self {
        self.columns(left, Op::Lt, right)
    }

    pub fn col_lte(self, left: &str, right: &str) -> Self {
        self.columns(left, Op::Lte, right)
    }

    /// 追加 `NOT (<pred>)`。
    pub fn not(self, pred: Predicate) -> Self {
        self.push(Node::Not(pred))
    }

    pub fn false_(self) -> Self {
        self.push(Node::Literal("FALSE"))
    }

    pub fn true_(self) -> Self {
        self.push(Node::Literal("TRUE"))
    }

    /// 链式连接词 ` AND `。
    pub fn and(self) -> Self {
        self.push(Node::Connective(" AND "))
    }

    /// 链式连接词 ` OR `。
    pub fn or(self) -> Self {
        self.push(Node::Connective(" OR "))
    }

    fn render_at(&self, b: &mut Builder, depth: usize) {
        for n in &self.nodes {
            n.render(b, depth);
        }
    }
}

impl Querier for Predicate {
    fn render(&self, b: &mut Builder) {
        self.render_at(b, self.depth);
    }
}

// 空成员被丢弃；只剩一个成员时直接返回它本身，这样它的节点数决定外层是否加括号。
fn group(sep: &'static str, preds: impl IntoIterator<Item = Predicate>) -> Predicate {
    let mut preds: Vec<Predicate> = preds.into_iter().filter(|p| !p.is_empty()).collect();
    match preds.len() {
        0 => p(),
        1 => preds.swap_remove(0).with_depth(0),
        _ => p().push(Node::Group { sep, preds }),
    }
}

/// `AND` 组合。
pub fn and(preds: impl IntoIterator<Item = Predicate>) -> Predicate {
    group("AND", preds)
}

/// `OR` 组合。
pub fn or(preds: impl IntoIterator<Item = Predicate>) -> Predicate {
    group("OR", preds)
}

pub fn not(pred: Predicate) -> Predicate {
    p().not(pred)
}

pub fn eq(column: &str, value: impl Into<SqlValue>) -> Predicate {
    p().eq(column, value)
}

pub fn neq(column: &str, value: impl Into<SqlValue>) -> Predicate {
    p().neq(column, value)
}

pub fn gt(column: &str, value: impl Into<SqlValue>) -> Predicate {
    p().gt(column, value)
}

pub fn gte(column: &str, value: impl Into<SqlValue>) -> Predicate {
    p().gte(column, value)
}

pub fn lt(column: &str, value: impl Into<SqlValue>) -> Predicate {
    p().lt(column, value)
}

pub fn lte(column: &str, value: impl Into<SqlValue>) -> Predicate {
    p().lte(column, value)
}

pub fn like(column: &str, pattern: impl Into<SqlValue>) -> Predicate {
    p().like(column, pattern)
}

pub fn in_values<I, V>(column: &str, values: I) -> Predicate
where
    I: IntoIterator<Item = V>,
    V: Into<SqlValue>,
{
    p().in_values(column, values)
}

pub fn not_in<I, V>(column: &str, values: I) -> Predicate
where
    I: IntoIterator<Item = V>,
    V: Into<SqlValue>,
{
    p().not_in(column, values)
}

pub fn in_query(column: &str, query: impl Querier + 'static) -> Predicate {
    p().in_query(column, query)
}

pub fn is_null(column: &str) -> Predicate {
    p().is_null(column)
}

pub fn not_null(column: &str) -> Predicate {
    p().not_null(column)
}

pub fn col_eq(left: &str, right: &str) -> Predicate {
    p().col_eq(left, right)
}

pub fn col_neq(left: &str, right: &str) -> Predicate {
    p().col_neq(left, right)
}

pub fn col_gt(left: &str, right: &str) -> Predicate {
    p().col_gt(left, right)
}

pub fn col_gte(left: &str, right: &str) -> Predicate {
    p().col_gte(left, right)
}

pub fn col_lt(left: &str, right: &str) -> Predicate {
    p().col_lt(left, right)
}

pub fn col_lte(left: &str, right: &str) -> Predicate {
    p().col_lte(left, right)
}

pub fn false_() -> Predicate {
    p().false_()
}

pub fn true_() -> Predicate {
    p().true_()
}

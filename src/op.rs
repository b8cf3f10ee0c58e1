//! 运算符：谓词比较与算术运算。

/// 封闭的运算符集合，每个运算符对应固定的 SQL 字面量。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    // 谓词运算符
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Like,
    IsNull,
    NotNull,

    // 算术运算符
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

const OPS: [Op; 16] = [
    Op::Eq,
    Op::Neq,
    Op::Gt,
    Op::Gte,
    Op::Lt,
    Op::Lte,
    Op::In,
    Op::NotIn,
    Op::Like,
    Op::IsNull,
    Op::NotNull,
    Op::Add,
    Op::Sub,
    Op::Mul,
    Op::Div,
    Op::Mod,
];

impl Op {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Like => "LIKE",
            Self::IsNull => "IS NULL",
            Self::NotNull => "IS NOT NULL",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        }
    }

    /// 只出现在操作数之后的运算符（`IS NULL` / `IS NOT NULL`）。
    pub fn is_suffix(self) -> bool {
        matches!(self, Self::IsNull | Self::NotNull)
    }

    /// 按声明顺序把数值编码映射为运算符。
    ///
    /// # Panics
    ///
    /// 编码越界属于调用方的代码缺陷，直接 panic（`invalid op N`）。
    pub fn from_code(code: u8) -> Self {
        match OPS.get(code as usize) {
            Some(op) => *op,
            None => panic!("invalid op {code}"),
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::Op;
    use pretty_assertions::assert_eq;

    #[test]
    fn codes_follow_declaration_order() {
        for code in 0..16u8 {
            assert_eq!(Op::from_code(code).code(), code);
        }
        assert_eq!(Op::from_code(0), Op::Eq);
        assert_eq!(Op::from_code(3).as_str(), ">=");
        assert_eq!(Op::from_code(7), Op::NotIn);
        assert_eq!(Op::from_code(15).as_str(), "%");
    }

    #[test]
    fn suffix_ops() {
        assert!(Op::IsNull.is_suffix());
        assert!(Op::NotNull.is_suffix());
        assert!(!Op::Like.is_suffix());
    }

    #[test]
    #[should_panic(expected = "invalid op 16")]
    fn out_of_range_code_panics() {
        Op::from_code(16);
    }
}

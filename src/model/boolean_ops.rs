//! Boolean Operations extension types
//!
//! Only the declaration is modelled: a component group tagged with an
//! operation. Evaluating the operation on geometry is left to consumers.

use crate::error::Error;

/// Boolean operation applied to the components of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BooleanOpType {
    /// Union - combine all volumes
    #[default]
    Union,
    /// Difference - subtract the following volumes from the first
    Difference,
    /// Intersection - keep only overlapping volume
    Intersection,
}

impl BooleanOpType {
    /// Convert operation type to string
    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanOpType::Union => "union",
            BooleanOpType::Difference => "difference",
            BooleanOpType::Intersection => "intersection",
        }
    }
}

impl std::str::FromStr for BooleanOpType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "union" => Ok(BooleanOpType::Union),
            "difference" => Ok(BooleanOpType::Difference),
            "intersection" => Ok(BooleanOpType::Intersection),
            _ => Err(Error::InvalidFormat(format!(
                "Invalid boolean operation '{}'",
                s
            ))),
        }
    }
}

/// Whether the operands form one physical body or stay logically grouped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Association {
    /// Operands are merged into one physical body
    #[default]
    Physical,
    /// Operands stay separate bodies
    Logical,
}

impl Association {
    /// Convert association to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Association::Physical => "physical",
            Association::Logical => "logical",
        }
    }
}

impl std::str::FromStr for Association {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "physical" => Ok(Association::Physical),
            "logical" => Ok(Association::Logical),
            _ => Err(Error::InvalidFormat(format!("Invalid association '{}'", s))),
        }
    }
}

/// Boolean operation declared on a `<components>` element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BooleanOperationAttr {
    /// Operand association
    pub association: Association,
    /// Operation type
    pub operation: BooleanOpType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operation() {
        assert_eq!(
            "difference".parse::<BooleanOpType>().unwrap(),
            BooleanOpType::Difference
        );
        assert!("xor".parse::<BooleanOpType>().is_err());
        assert_eq!(Association::Logical.as_str(), "logical");
    }
}

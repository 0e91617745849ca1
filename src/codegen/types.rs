//! Type mapping from source types to VHDL

use crate::parser::ast::TypeName;
use crate::symbols::StructInfo;

/// Bit width of a scalar type; anything without its own width is 32 bits
pub fn bit_width(ty: &TypeName) -> usize {
    match ty {
        TypeName::Double => 64,
        TypeName::Char => 8,
        TypeName::Int | TypeName::Float | TypeName::Void | TypeName::Struct(_) => 32,
    }
}

/// VHDL subtype used for a declaration of `ty`
pub fn vhdl_type(ty: &TypeName) -> String {
    match ty {
        TypeName::Struct(name) => record_name(name),
        scalar => format!("std_logic_vector({} downto 0)", bit_width(scalar) - 1),
    }
}

pub fn record_name(struct_name: &str) -> String {
    format!("{}_t", struct_name)
}

/// Record type declaration for a struct, followed by a blank line
pub fn record_declaration(info: &StructInfo) -> String {
    let mut out = format!(
        "-- Struct {} as VHDL record\ntype {} is record\n",
        info.name,
        record_name(&info.name)
    );
    for (field, ty) in &info.fields {
        out.push_str(&format!("  {} : {};\n", field, vhdl_type(ty)));
    }
    out.push_str("end record;\n\n");
    out
}

/// Quoted two's complement bit string of `value`, `width` characters long
pub fn bit_string(value: i64, width: usize) -> String {
    let width = width.clamp(1, 64);
    let mask: u128 = (1u128 << width) - 1;
    let bits = (value as i128 as u128) & mask;
    format!("\"{:0width$b}\"", bits, width = width)
}

/// Literal array elements render as bit strings only for integer and
/// character arrays
pub fn uses_bit_strings(elem: &TypeName) -> bool {
    matches!(elem, TypeName::Int | TypeName::Char)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TypeName::Int, "std_logic_vector(31 downto 0)")]
    #[case(TypeName::Float, "std_logic_vector(31 downto 0)")]
    #[case(TypeName::Double, "std_logic_vector(63 downto 0)")]
    #[case(TypeName::Char, "std_logic_vector(7 downto 0)")]
    #[case(TypeName::Void, "std_logic_vector(31 downto 0)")]
    #[case(TypeName::Struct("Point".to_string()), "Point_t")]
    fn test_type_map(#[case] ty: TypeName, #[case] expected: &str) {
        assert_eq!(vhdl_type(&ty), expected);
    }

    #[test]
    fn test_bit_strings() {
        assert_eq!(bit_string(5, 8), "\"00000101\"");
        assert_eq!(bit_string(-1, 8), "\"11111111\"");
        assert_eq!(
            bit_string(-2, 32),
            "\"11111111111111111111111111111110\""
        );
    }

    #[test]
    fn test_record_declaration() {
        let info = StructInfo {
            name: "Point".to_string(),
            fields: vec![
                ("x".to_string(), TypeName::Int),
                ("tag".to_string(), TypeName::Char),
            ],
        };
        assert_eq!(
            record_declaration(&info),
            "-- Struct Point as VHDL record\n\
             type Point_t is record\n  \
             x : std_logic_vector(31 downto 0);\n  \
             tag : std_logic_vector(7 downto 0);\n\
             end record;\n\n"
        );
    }
}

//! Static field access detection
//!
//! Per instruction: the assignment target contributes a SET when it is a
//! static field; every static field among the values the instruction reads
//! contributes a GET. Each distinct field is reported once per kind, in
//! first-seen order, so a read and a write of the same field stay two
//! records.

use crate::shared::models::{RawFieldRef, RawInst, RawValue};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct StaticAccesses<'a> {
    pub sets: Vec<&'a RawFieldRef>,
    pub gets: Vec<&'a RawFieldRef>,
}

impl<'a> StaticAccesses<'a> {
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty() && self.gets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sets.len() + self.gets.len()
    }
}

pub struct StaticAccessCollector;

impl StaticAccessCollector {
    pub fn collect(inst: &RawInst) -> StaticAccesses<'_> {
        let mut accesses = StaticAccesses::default();

        if let RawInst::Assign {
            lhv: RawValue::Field(field),
            ..
        } = inst
        {
            if field.is_static() {
                accesses.sets.push(field);
            }
        }

        for operand in inst.read_operands() {
            operand.walk(&mut |value| {
                if let RawValue::Field(field) = value {
                    if field.is_static() && !contains(&accesses.gets, field) {
                        accesses.gets.push(field);
                    }
                }
            });
        }

        accesses
    }
}

/// Every value an instruction mentions, including its assignment target
pub fn for_each_value<'a>(inst: &'a RawInst, f: &mut impl FnMut(&'a RawValue)) {
    if let RawInst::Assign { lhv, .. } = inst {
        lhv.walk(f);
    }
    if let RawInst::Catch(catch) = inst {
        catch.throwable.walk(f);
    }
    for operand in inst.read_operands() {
        operand.walk(f);
    }
}

fn contains(fields: &[&RawFieldRef], field: &RawFieldRef) -> bool {
    fields
        .iter()
        .any(|f| f.declaring_class == field.declaring_class && f.field_name == field.field_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{BinaryOp, RawExpr};

    fn counter() -> RawValue {
        RawValue::static_field("Main", "counter", "int")
    }

    #[test]
    fn test_read_and_write_of_same_field_are_distinct() {
        // Main.counter = Main.counter + 1
        let inst = RawInst::assign(
            counter(),
            RawExpr::binary(BinaryOp::Add, counter(), RawValue::int(1), "int"),
        );
        let accesses = StaticAccessCollector::collect(&inst);
        assert_eq!(accesses.sets.len(), 1);
        assert_eq!(accesses.gets.len(), 1);
        assert_eq!(accesses.sets[0].field_name, "counter");
        assert_eq!(accesses.gets[0].field_name, "counter");
    }

    #[test]
    fn test_repeated_reads_collapse() {
        let inst = RawInst::assign(
            RawValue::local(0, "%0", "int"),
            RawExpr::binary(BinaryOp::Mul, counter(), counter(), "int"),
        );
        let accesses = StaticAccessCollector::collect(&inst);
        assert!(accesses.sets.is_empty());
        assert_eq!(accesses.gets.len(), 1);
    }

    #[test]
    fn test_instance_fields_are_ignored() {
        let inst = RawInst::assign(
            RawValue::instance_field(RawValue::local(0, "%0", "A"), "A", "f", "int"),
            RawExpr::Value(RawValue::int(3)),
        );
        assert!(StaticAccessCollector::collect(&inst).is_empty());
    }

    #[test]
    fn test_nested_static_read_in_array_index() {
        // %1 = arr[Main.counter]
        let inst = RawInst::assign(
            RawValue::local(1, "%1", "int"),
            RawExpr::Value(RawValue::array_access(
                RawValue::local(0, "%0", "int[]"),
                counter(),
                "int",
            )),
        );
        assert_eq!(StaticAccessCollector::collect(&inst).gets.len(), 1);
    }
}

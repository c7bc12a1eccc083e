use rstest::rstest;

use super::*;
use crate::attributes::AttributeOp;

fn foo_bar() -> AttributeList {
	AttributeList::new().with(AttributeOp::set("foo", "bar"))
}

fn op(opcode: Opcode, chars: usize, lines: usize, attribs: AttributeList, text: &str) -> OpComponent {
	OpComponent::new(opcode, chars, lines, attribs, text).unwrap()
}

#[test]
fn new_validates_text() {
	assert_eq!(
		OpComponent::new(Opcode::Insert, 2, 1, AttributeList::new(), "\na"),
		Err(ChangesetError::MultilineWithoutNewline)
	);
	assert_eq!(
		OpComponent::new(Opcode::Remove, 3, 0, AttributeList::new(), "ab"),
		Err(ChangesetError::TextLengthMismatch { expected: 3, actual: 2 })
	);
}

#[test]
fn keep_drops_text() {
	let keep = op(Opcode::Keep, 2, 1, foo_bar(), "a\n");
	assert_eq!(keep.text(), "");

	let insert = op(Opcode::Insert, 2, 1, foo_bar(), "a\n");
	assert_eq!(insert.with_opcode(Opcode::Keep), OpComponent::keep(2, 1, foo_bar()));
	assert_eq!(insert.with_opcode(Opcode::Insert), insert);
}

#[test]
fn counts_chars_not_bytes() {
	let c = OpComponent::insert("héllo\n", AttributeList::new()).unwrap();
	assert_eq!((c.chars(), c.lines()), (6, 1));

	let mut left = c.clone();
	left.trim_left(2, 0).unwrap();
	assert_eq!(left.text(), "llo\n");

	let mut right = c;
	right.trim_right(2, 0).unwrap();
	assert_eq!(right.text(), "hé");
}

#[rstest]
#[case::different_lengths(
	op(Opcode::Insert, 1, 0, AttributeList::new(), "a"),
	op(Opcode::Insert, 2, 0, AttributeList::new(), "ab"),
	false,
	false
)]
#[case::identical(
	op(Opcode::Insert, 1, 0, foo_bar(), "a"),
	op(Opcode::Insert, 1, 0, foo_bar(), "a"),
	false,
	true
)]
#[case::ignored_opcode(
	op(Opcode::Remove, 1, 0, foo_bar(), "a"),
	op(Opcode::Insert, 1, 0, foo_bar(), "a"),
	true,
	true
)]
#[case::opcode_compared(
	op(Opcode::Remove, 1, 0, foo_bar(), "a"),
	op(Opcode::Insert, 1, 0, foo_bar(), "a"),
	false,
	false
)]
#[case::keep_left_skips_text(
	op(Opcode::Keep, 1, 0, foo_bar(), ""),
	op(Opcode::Insert, 1, 0, foo_bar(), "a"),
	true,
	true
)]
#[case::keep_right_skips_text(
	op(Opcode::Insert, 1, 0, foo_bar(), "a"),
	op(Opcode::Keep, 1, 0, foo_bar(), ""),
	true,
	true
)]
#[case::different_text(
	op(Opcode::Insert, 1, 0, foo_bar(), "a"),
	op(Opcode::Remove, 1, 0, foo_bar(), "b"),
	true,
	false
)]
fn matches(#[case] a: OpComponent, #[case] b: OpComponent, #[case] ignore_opcode: bool, #[case] expected: bool) {
	assert_eq!(a.matches(&b, ignore_opcode), expected);
}

#[test]
fn trim() {
	let c = op(Opcode::Insert, 5, 2, AttributeList::new(), "ab\nc\n");

	let mut left = c.clone();
	left.trim_left(3, 1).unwrap();
	assert_eq!(left, op(Opcode::Insert, 2, 1, AttributeList::new(), "c\n"));

	let mut right = c.clone();
	right.trim_right(3, 1).unwrap();
	assert_eq!(right, op(Opcode::Insert, 3, 1, AttributeList::new(), "ab\n"));

	assert!(matches!(
		c.clone().trim_left(6, 0),
		Err(ChangesetError::TrimOutOfRange { requested_chars: 6, .. })
	));
	assert!(c.clone().trim_right(1, 3).is_err());
}

#[rstest]
#[case::insert(Opcode::Insert, AttributeOp::set("foo", "bar"), Opcode::Remove, AttributeOp::set("foo", "bar"))]
#[case::remove(Opcode::Remove, AttributeOp::remove("foo", "bar"), Opcode::Insert, AttributeOp::remove("foo", "bar"))]
#[case::keep(Opcode::Keep, AttributeOp::set("foo", "bar"), Opcode::Keep, AttributeOp::remove("foo", "bar"))]
fn invert(
	#[case] opcode: Opcode,
	#[case] attrib: AttributeOp,
	#[case] expected_opcode: Opcode,
	#[case] expected_attrib: AttributeOp,
) {
	let mut c = op(opcode, 1, 0, AttributeList::new().with(attrib), "a");
	c.invert();
	assert_eq!(c, op(expected_opcode, 1, 0, AttributeList::new().with(expected_attrib), "a"));
}

#[test]
fn append_same_kind() {
	let c = op(Opcode::Insert, 3, 1, foo_bar(), "ab\n");
	let mut doubled = c.clone();
	doubled.append(&c).unwrap();
	assert_eq!(doubled, op(Opcode::Insert, 6, 2, foo_bar(), "ab\nab\n"));
}

#[test]
fn append_to_empty_adopts_other() {
	let c = op(Opcode::Insert, 3, 1, foo_bar(), "ab\n");
	let mut empty = OpComponent::empty();
	empty.append(&c).unwrap();
	assert_eq!(empty, c);
}

#[test]
fn append_skips_empty() {
	let c = op(Opcode::Insert, 3, 1, foo_bar(), "ab\n");
	let mut same = c.clone();
	same.append(&OpComponent::empty()).unwrap();
	assert_eq!(same, c);
}

#[test]
fn append_rejects_mismatch() {
	let c = op(Opcode::Insert, 3, 1, foo_bar(), "ab\n");
	let keep = c.with_opcode(Opcode::Keep);
	assert_eq!(c.clone().append(&keep).err(), Some(ChangesetError::AppendMismatch));

	let mut other_attribs = c.clone();
	other_attribs.attribs = AttributeList::new().with(AttributeOp::set("x", "y"));
	assert_eq!(c.clone().append(&other_attribs).err(), Some(ChangesetError::AppendMismatch));
}

#[test]
fn take_line_splits_on_newlines() {
	let mut c = op(Opcode::Insert, 4, 2, AttributeList::new(), "a\nb\n");
	assert_eq!(c.take_line(), op(Opcode::Insert, 2, 1, AttributeList::new(), "a\n"));
	assert_eq!(c.take_line(), op(Opcode::Insert, 2, 1, AttributeList::new(), "b\n"));
	assert!(c.is_empty());
}

#[test]
fn take_line_keeps_attributes() {
	let mut c = op(Opcode::Insert, 6, 2, foo_bar(), "ab\ncd\n");
	assert_eq!(c.take_line(), op(Opcode::Insert, 3, 1, foo_bar(), "ab\n"));
	assert_eq!(c, op(Opcode::Insert, 3, 1, foo_bar(), "cd\n"));
	assert_eq!(c.take_line().text(), "cd\n");
	assert!(c.is_empty());
}

#[test]
fn take_line_takes_inline_component_whole() {
	let mut c = op(Opcode::Insert, 2, 0, foo_bar(), "cd");
	assert_eq!(c.take_line(), op(Opcode::Insert, 2, 0, foo_bar(), "cd"));
	assert!(c.is_empty());
}

#[test]
fn pack() {
	let mut pool: AttributePool = [("foo", "bar"), ("x", "y")].into_iter().collect();
	let attribs = AttributeList::new()
		.with(AttributeOp::set("foo", "bar"))
		.with(AttributeOp::set("x", "y"));
	let c = op(Opcode::Insert, 10, 2, attribs, "1234\n6789\n");
	assert_eq!(
		c.pack(&mut pool).unwrap(),
		PackedOps {
			ops: "*0*1|2+a".into(),
			text: "1234\n6789\n".into(),
			delta_len: 10,
		}
	);
	assert_eq!(OpComponent::empty().pack(&mut pool).unwrap(), PackedOps::default());
}

#[rstest]
#[case(Opcode::Insert, 3)]
#[case(Opcode::Remove, -3)]
#[case(Opcode::Keep, 0)]
fn delta_len(#[case] opcode: Opcode, #[case] expected: isize) {
	assert_eq!(op(opcode, 3, 0, AttributeList::new(), "abc").delta_len(), expected);
}

#[test]
fn keep_composes_algebraically() {
	let mut keep = OpComponent::keep(1, 0, AttributeList::new());
	keep.compose_attributes(&AttributeList::new().with(AttributeOp::remove("foo", "bar")))
		.unwrap();
	assert_eq!(keep.attribs(), &AttributeList::new().with(AttributeOp::remove("foo", "bar")));

	let mut insert = op(Opcode::Insert, 1, 0, AttributeList::new(), "a");
	assert!(matches!(
		insert.compose_attributes(&AttributeList::new().with(AttributeOp::remove("foo", "bar"))),
		Err(ChangesetError::RemoveNonExisting { .. })
	));
}

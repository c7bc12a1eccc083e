use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;
use crate::attributes::AttributeList;
use crate::document::Line;
use crate::wire::PackedDocument;

fn pool() -> AttributePool {
	[("author", "x"), ("bold", "true"), ("italic", "true"), ("author", "y")]
		.into_iter()
		.collect()
}

fn sample() -> Document {
	Document::unpack(PackedDocument {
		lines: vec![Line::new("*0+2|1+2", "abc\n"), Line::new("+4*1|1+2", "defgh\n")],
		pool: pool(),
	})
}

fn cs(op: &str) -> Changeset {
	Changeset::unpack(&PackedChangeset::new(op, pool())).unwrap()
}

fn packed(result: Result<Changeset>) -> Result<String> {
	result?.pack_into(&mut pool())
}

/// Reformats, removes and inserts across both sample lines.
fn complex() -> Changeset {
	let pool = [("italic", "true"), ("author", "y"), ("bold", "true"), ("author", "x")]
		.into_iter()
		.collect();
	let packed = PackedChangeset::new("X:a>1=1^3*0=1*0|1=2*1=4*2|1-2*1|1+3$h\nij\n", pool).with_author("y");
	Changeset::unpack(&packed).unwrap()
}

#[test]
fn unpack_reads_header_and_author() {
	let cs = complex();
	assert_eq!(cs.old_len(), 10);
	assert_eq!(cs.new_len(), 11);
	assert_eq!(cs.author(), Some("y"));
	assert_eq!(cs.ops().len(), 6);
}

#[rstest]
#[case::bad_prefix("Y:0>0")]
#[case::missing_sign("X:0=0")]
#[case::bad_opcode("X:0>1*0%1$a")]
fn unpack_rejects_malformed(#[case] op: &str) {
	let result = Changeset::unpack(&PackedChangeset::new(op, pool()));
	assert!(matches!(result, Err(ChangesetError::Malformed { .. })), "{result:?}");
}

#[test]
fn unpack_rejects_negative_length() {
	let result = Changeset::unpack(&PackedChangeset::new("X:1<2-2$ab", pool()));
	assert_eq!(result, Err(ChangesetError::LengthUnderflow { old_len: 1, delta: -2 }));
}

#[test]
fn pack_uses_fresh_pool_and_keeps_author() {
	let packed = cs("X:0>2*3+2$ab").pack().unwrap();
	assert_eq!(packed, PackedChangeset::new("X:0>2*0+2$ab", [("author", "y")].into_iter().collect()));
}

#[test]
fn pack_checks_declared_length() {
	let broken = cs("X:4>4|2+2$\n\n");
	assert_eq!(broken.pack(), Err(ChangesetError::DeltaMismatch { declared: 4, actual: 2 }));
}

#[test]
fn apply_inserts_at_start() {
	let doc = cs("X:a>5+5$hello").apply_to(sample()).unwrap();
	assert_eq!(doc.length(), 15);
	assert!(doc.text().starts_with("hello"));
}

#[test]
fn apply_complex_mutation() {
	let doc = complex().apply_to(sample()).unwrap();
	assert_eq!(
		doc.lines(),
		[Line::new("*0+1*2|1+3", "abc\n"), Line::new("*3|1+7", "defgij\n")]
	);
}

#[test]
fn apply_rejects_stale_removal() {
	let packed = PackedChangeset::new("X:a<1=1-1$b", AttributePool::new()).with_author("y");
	let result = Changeset::unpack(&packed).unwrap().apply_to(sample());
	assert_eq!(result, Err(ChangesetError::RemovedMismatch));
}

#[test]
fn apply_checks_final_length() {
	let result = cs("X:a>6+5$hello").apply_to(sample());
	assert_eq!(result, Err(ChangesetError::FinalLengthMismatch { expected: 16, actual: 15 }));
}

#[test]
fn invert_restores_document() {
	let cs = complex();
	let changed = cs.apply_to(sample()).unwrap();
	let inverted = cs.invert();

	let packed = inverted.pack().unwrap();
	assert_eq!(packed.op, "X:b<1=1^1*0=1^1|1=2^2=4*2|1-3*3|1+2$ij\nh\n");
	assert_eq!(
		packed.pool,
		[("author", "x"), ("italic", "true"), ("author", "y"), ("bold", "true")]
			.into_iter()
			.collect::<AttributePool>()
	);
	assert_eq!(packed.author.as_deref(), Some("y"));

	assert_eq!(inverted.apply_to(changed).unwrap(), sample());
}

#[rstest]
#[case::simple("X:0>3+3$abc", "X:3>3=3+3$def", "X:0>6+6$abcdef")]
#[case::with_newline("X:0>2+2$ab", "X:2>1|1+1$\n", "X:0>3|1+1+2$\nab")]
#[case::delete_inserted("X:0>3+3$abc", "X:3<1=1-1$b", "X:0>2+2$ac")]
#[case::delete_from_format("X:3>0*0=3", "X:3<1=1*0-1$b", "X:3<1*0=1-1*0=1$b")]
#[case::delete_from_unformat("X:3>0^0=3", "X:3<1=1-1$b", "X:3<1^0=1*0-1^0=1$b")]
#[case::delete_inserted_and_insert_new("X:0>3+3$abc", "X:3<1-2+1$abd", "X:0>2+2$dc")]
#[case::delete_big_then_small_with_lines("X:8<4-4$abcd", "X:4<2|2-2$\n\n", "X:8<6|2-6$abcd\n\n")]
#[case::reformat_string("X:0>4*0+2*1+2$abcd", "X:4>0*1=1*2=2*0=1", "X:0>4*0*1+1*0*2+1*1*2+1*0*1+1$abcd")]
#[case::format_then_remove("X:4>0*0=2", "X:4<2*0*1-2$ab", "X:4<2*1-2$ab")]
#[case::unformat_then_remove("X:4>0^0=2", "X:4<2*1-2$ab", "X:4<2*0*1-2$ab")]
#[case::remove_all_then_insert("X:3<3|1-3$12\n", "X:0>2+2$XY", "X:3<1|1-3+2$12\nXY")]
fn compose(#[case] first: &str, #[case] second: &str, #[case] expected: &str) {
	assert_eq!(packed(cs(first).compose(&cs(second))).unwrap(), expected);
}

#[test]
fn compose_rejects_mismatched_removal() {
	let result = cs("X:0>3+3$abc").compose(&cs("X:3<1=1-1$c"));
	assert_eq!(result, Err(ChangesetError::ComposeRemoveMismatch));
}

#[test]
fn compose_rejects_other_version() {
	let result = cs("X:0>3+3$abc").compose(&cs("X:4>1+1$c"));
	assert_eq!(result, Err(ChangesetError::NotComposable { new_len: 3, old_len: 4 }));
}

#[rstest]
#[case::insert_tie_left("X:0>2+2$ab", "X:0>2+2$cd", Side::Left, "X:2>2=2+2$ab")]
#[case::insert_tie_right("X:0>2+2$cd", "X:0>2+2$ab", Side::Right, "X:2>2+2$cd")]
#[case::newline_goes_last_left("X:0>2+2$ab", "X:0>1|1+1$\n", Side::Left, "X:1>2+2$ab")]
#[case::newline_goes_last_right("X:0>2+2$ab", "X:0>1|1+1$\n", Side::Right, "X:1>2+2$ab")]
#[case::both_newlines_left("X:0>2|1+1+1$\na", "X:0>2|1+1+1$\nb", Side::Left, "X:2>2|1=1=1|1+1+1$\na")]
#[case::both_newlines_right("X:0>2|1+1+1$\nb", "X:0>2|1+1+1$\na", Side::Right, "X:2>2|1+1+1$\nb")]
#[case::insert_beats_remove_left("X:2>1+1$a", "X:2<1-1$b", Side::Left, "X:1>1+1$a")]
#[case::insert_beats_remove_right("X:2>1+1$a", "X:2<1-1$b", Side::Right, "X:1>1+1$a")]
#[case::remove_partly_removed("X:8<4-4$abcd", "X:8<2-2$ab", Side::Left, "X:6<2-2$cd")]
#[case::remove_fully_removed("X:8<2-2$ab", "X:8<4-4$abcd", Side::Left, "X:4>0")]
#[case::remove_reformatted_keep("X:8<2-2$ab", "X:8>0*0=4", Side::Left, "X:8<2*0-2$ab")]
#[case::keep_shrunk_by_remove("X:8>2=8+2$ab", "X:8<4-4$abcd", Side::Left, "X:4>2=4+2$ab")]
#[case::keep_collapsed_by_remove("X:8>2=4+2$ab", "X:8<6-6$abcdef", Side::Left, "X:2>2+2$ab")]
#[case::keep_moved_by_insert("X:4>1|1=4+1$a", "X:4>5+5$bcdef", Side::Left, "X:9>1|1=9+1$a")]
#[case::both_keeps("X:4>0*0*1=4", "X:4>0=2*2*3=2", Side::Left, "X:4>0*0*1=2^3*0*1=2")]
#[case::format_pushed_by_insert("X:2>0^0*3=2+1$a", "X:2>4*0+4$abcd", Side::Left, "X:6>1=4^0*3=2+1$a")]
#[case::remove_what_was_reformatted("X:2<2*0*1-2$ab", "X:2>0^0*2*3=2", Side::Left, "X:2<2*1*2*3-2$ab")]
fn transform(#[case] this: &str, #[case] other: &str, #[case] side: Side, #[case] expected: &str) {
	assert_eq!(packed(cs(this).transform(&cs(other), side)).unwrap(), expected);
}

#[test]
fn transform_does_not_add_keeps_past_own_ops() {
	let transformed = cs("X:4>1=1-2+3$abcde").transform(&cs("X:4>4=4|1+4$qwe\n"), Side::Left).unwrap();
	let expected: ComponentList = [
		OpComponent::keep(1, 0, AttributeList::new()),
		OpComponent::new(Opcode::Remove, 2, 0, AttributeList::new(), "ab").unwrap(),
		OpComponent::insert("cde", AttributeList::new()).unwrap(),
	]
	.into_iter()
	.collect();
	assert_eq!(transformed.ops(), &expected);
	assert_eq!(transformed.old_len(), 8);
	assert_eq!(transformed.new_len(), 9);
}

#[test]
fn transform_rejects_other_version() {
	let result = cs("X:0>2+2$ab").transform(&cs("X:1>1+1$c"), Side::Left);
	assert_eq!(result, Err(ChangesetError::NotTransformable { left: 0, right: 1 }));
}

#[rstest]
#[case::pushed_by_char_insert("X:4>2=2+2$ab", (3, 0), Side::Left, (5, 0))]
#[case::split_by_newline_insert("X:4>2=2|1+2$b\n", (3, 0), Side::Left, (1, 1))]
#[case::pushed_by_far_line_insert("X:4>4|2+2$\n\n", (1, 2), Side::Left, (1, 4))]
#[case::insert_tie_left("X:4>2=2+2$ab", (2, 0), Side::Left, (2, 0))]
#[case::insert_tie_right("X:4>2=2+2$ab", (2, 0), Side::Right, (4, 0))]
#[case::removed_before("X:8<4-4$abcd", (6, 0), Side::Left, (2, 0))]
#[case::collapsed_by_remove("X:8<4=2-4$abcd", (4, 0), Side::Left, (2, 0))]
#[case::collapsed_by_multiline_remove("X:a<4|1=2=1|2-3$\nb\n", (2, 1), Side::Left, (1, 1))]
#[case::joined_by_multiline_remove("X:8<4=2|1-4$abc\n", (1, 1), Side::Left, (3, 0))]
#[case::lines_removed_before("X:a<4|2-4$a\nb\n", (1, 3), Side::Left, (1, 1))]
#[case::keep_leaves_position("X:8>2=8+2$ab", (7, 0), Side::Left, (7, 0))]
fn transform_position(
	#[case] op: &str,
	#[case] pos: (usize, usize),
	#[case] side: Side,
	#[case] expected: (usize, usize),
) {
	let moved = cs(op).transform_position(Position::new(pos.0, pos.1), side);
	assert_eq!(moved, Position::new(expected.0, expected.1));
}

#[test]
fn side_parses_and_displays() {
	assert_eq!("left".parse::<Side>(), Ok(Side::Left));
	assert_eq!("right".parse::<Side>(), Ok(Side::Right));
	assert_eq!("up".parse::<Side>(), Err(ParseSideError("up".to_string())));
	assert_eq!(Side::Right.to_string(), "right");
}

#[test]
fn builder_changeset_round_trips() {
	let mut builder = Changeset::builder(&sample(), Some("z"));
	builder.keep(2, 0).unwrap().remove(2, 1).unwrap().insert("xy\n", None).unwrap();
	let cs = builder.finish().unwrap();
	let packed = cs.pack().unwrap();
	assert_eq!(Changeset::unpack(&packed).unwrap(), cs);
	assert_eq!(cs.apply_to(sample()).unwrap().text(), "abxy\ndefgh\n");
}

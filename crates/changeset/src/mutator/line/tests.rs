use pretty_assertions::assert_eq;

use super::*;
use crate::attributes::AttributeList;

fn pool() -> AttributePool {
	[
		("foo", "bar"),
		("author", "x"),
		("bold", "true"),
		("list", "1"),
		("italic", "true"),
	]
	.into_iter()
	.collect()
}

fn sample() -> Line {
	Line::new("*0+2*1+4*2+6", "abcdefghijkl")
}

fn mutator(line: Line) -> LineMutator {
	LineMutator::new(line, &pool()).unwrap()
}

fn ins(text: &str, attribs: &str) -> OpComponent {
	OpComponent::insert(text, AttributeList::unpack(attribs, &pool()).unwrap()).unwrap()
}

fn finish(m: LineMutator) -> Line {
	m.finish(&mut pool()).unwrap()
}

#[test]
fn empty_line() {
	let mut m = mutator(Line::default());
	assert!(m.take_remaining().unwrap().is_empty());
	assert!(!m.is_mutated());
}

#[test]
fn builds_line_from_scratch() {
	let mut m = mutator(Line::default());
	for op in mutator(sample()).take_remaining().unwrap() {
		m.insert(op).unwrap();
	}
	assert_eq!(finish(m), sample());
}

#[test]
fn injected_component_is_read_first() {
	let mut m = mutator(sample());
	m.inject(ins("XX", "")).unwrap();
	assert_eq!(m.take(3).unwrap(), vec![ins("XX", ""), ins("a", "*0")]);
	assert_eq!(m.length(), 14);
}

#[test]
fn newline_at_end() {
	let mut m = mutator(Line::new("*0+4|1+1", "abcd\n"));
	assert_eq!(m.take_remaining().unwrap(), vec![ins("abcd", "*0"), ins("\n", "")]);
}

#[test]
fn splits_components() {
	let mut m = mutator(sample());
	m.skip(1).unwrap();
	assert_eq!(m.take(2).unwrap(), vec![ins("b", "*0"), ins("c", "*1")]);
	assert_eq!(m.take(1).unwrap(), vec![ins("d", "*1")]);
	assert_eq!(m.take_remaining().unwrap(), vec![ins("ef", "*1"), ins("ghijkl", "*2")]);
	assert_eq!(m.position(), 12);
	assert!(!m.is_mutated());
}

#[test]
fn unchanged_line_is_returned_as_is() {
	let original = Line::new("*0+1*0+1", "ab");
	let mut m = mutator(original.clone());
	m.skip(1).unwrap();
	assert_eq!(finish(m), original);
}

#[test]
fn insert_merges_with_neighbours() {
	let mut m = mutator(sample());
	m.skip(3).unwrap();
	m.insert(ins("XX", "*1")).unwrap();
	assert!(m.is_mutated());
	assert_eq!(finish(m), Line::new("*0+2*1+6*2+6", "abcXXdefghijkl"));
}

#[test]
fn remove() {
	let mut m = mutator(sample());
	m.skip(1).unwrap();
	assert_eq!(m.remove(2).unwrap(), vec![ins("b", "*0"), ins("c", "*1")]);
	assert_eq!(m.remaining(), 9);
	assert_eq!(finish(m), Line::new("*0+1*1+3*2+6", "adefghijkl"));
}

#[test]
fn newline_only_at_end() {
	let newline = ins("X\n", "");
	let mut m = mutator(Line::new("+2", "ab"));
	assert_eq!(m.insert(newline.clone()), Err(ChangesetError::NewlineNotAtEnd));

	m.skip(m.remaining()).unwrap();
	assert_eq!(m.insert(ins("a\nb\n", "")), Err(ChangesetError::NewlineNotAtEnd));

	m.insert(newline.clone()).unwrap();
	assert_eq!(m.clone().insert(newline), Err(ChangesetError::AlreadyHasNewline));
	assert_eq!(finish(m), Line::new("|1+4", "abX\n"));
}

#[test]
fn format_span() {
	let mut m = mutator(sample());
	m.skip(3).unwrap();
	m.apply_format(&OpComponent::keep(4, 0, AttributeList::unpack("*4", &pool()).unwrap()))
		.unwrap();
	assert_eq!(finish(m), Line::new("*0+2*1+1*1*4+3*2*4+1*2+5", "abcdefghijkl"));
}

#[test]
fn format_rejects_non_keep() {
	let mut m = mutator(sample());
	assert_eq!(m.apply_format(&ins("ab", "")), Err(ChangesetError::BadFormat));
}

#[test]
fn mixed_edits() {
	let mut m = mutator(sample());
	assert_eq!(m.remove(3).unwrap(), vec![ins("ab", "*0"), ins("c", "*1")]);
	m.insert(ins("XXXX", "*3")).unwrap();
	m.skip(4).unwrap();
	assert_eq!(m.remove(1).unwrap(), vec![ins("h", "*2")]);
	m.skip(m.remaining()).unwrap();
	m.insert(ins("YYY", "*4")).unwrap();
	assert_eq!(finish(m), Line::new("*3+4*1+3*2+5*4+3", "XXXXdefgijklYYY"));
}

#[test]
fn read_past_end() {
	assert_eq!(mutator(sample()).skip(100), Err(ChangesetError::UnexpectedEnd));
}

#[test]
fn insert_requires_insert_opcode() {
	let op = OpComponent::new(Opcode::Remove, 1, 0, AttributeList::new(), "x").unwrap();
	assert_eq!(mutator(sample()).insert(op), Err(ChangesetError::BadInsertOpcode(Opcode::Remove)));
}

#[test]
fn rejects_non_line_content() {
	assert_eq!(
		mutator(Line::new("-2", "xx")).take(1),
		Err(ChangesetError::NotAttributedString)
	);
	assert_eq!(
		mutator(Line::new("*0|1+1*1+2|1+1", "\nab\n")).take_remaining(),
		Err(ChangesetError::NotAttributedString)
	);
}

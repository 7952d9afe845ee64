//! Marshalling strategies running over the binary transport.

use std::any::TypeId;
use std::cell::RefCell;
use std::rc::Rc;

use refstream_binary::{BinaryReader, BinaryWriter};
use refstream_core::{
    Converter, ConverterRegistry, Handle, MarshalContext, MarshallingStrategy, StreamError,
    UnmarshalContext,
};

struct Person {
    name: String,
    next: Option<Rc<RefCell<Person>>>,
}

impl Person {
    fn handle(name: &str) -> Rc<RefCell<Person>> {
        Rc::new(RefCell::new(Person {
            name: name.to_owned(),
            next: None,
        }))
    }
}

fn as_person(handle: &Handle) -> Result<Rc<RefCell<Person>>, StreamError> {
    handle
        .clone()
        .downcast::<RefCell<Person>>()
        .map_err(|_| StreamError::Custom("expected a person".into()))
}

struct PersonConverter;

impl Converter for PersonConverter {
    fn can_convert(&self, ty: TypeId) -> bool {
        ty == TypeId::of::<RefCell<Person>>()
    }

    fn can_unmarshal(&self, hint: &str) -> bool {
        hint == "person"
    }

    fn marshal(&self, item: &Handle, ctx: &mut dyn MarshalContext) -> Result<(), StreamError> {
        let person = as_person(item)?;
        let person = person.borrow();
        ctx.writer().start_node("name", None)?;
        ctx.writer().set_value(&person.name)?;
        ctx.writer().end_node()?;
        if let Some(next) = &person.next {
            let next: Handle = next.clone();
            ctx.writer().start_node("next", Some("person"))?;
            ctx.convert_another(&next)?;
            ctx.writer().end_node()?;
        }
        Ok(())
    }

    fn unmarshal(&self, ctx: &mut dyn UnmarshalContext) -> Result<Handle, StreamError> {
        let cell = Person::handle("");
        let handle: Handle = cell.clone();
        while ctx.reader().has_more_children()? {
            ctx.reader().move_down()?;
            match ctx.reader().node_name().to_owned().as_str() {
                "name" => {
                    cell.borrow_mut().name = ctx.reader().value()?.unwrap_or_default();
                }
                "next" => {
                    let next = ctx.convert_another(Some(&handle))?;
                    cell.borrow_mut().next = Some(as_person(&next)?);
                }
                other => {
                    return Err(StreamError::Custom(format!("unexpected field `{other}`")));
                }
            }
            ctx.reader().move_up()?;
        }
        Ok(handle)
    }
}

fn registry() -> ConverterRegistry {
    let mut registry = ConverterRegistry::new();
    registry.register(0, Box::new(PersonConverter));
    registry
}

fn write_bytes(strategy: MarshallingStrategy, item: &Handle) -> Vec<u8> {
    let registry = registry();
    let mut writer = BinaryWriter::new();
    strategy
        .marshal(item, "person", &mut writer, &registry)
        .unwrap();
    writer.finish().unwrap()
}

fn read_bytes(strategy: MarshallingStrategy, bytes: &[u8]) -> Rc<RefCell<Person>> {
    let registry = registry();
    let mut reader = BinaryReader::from_bytes(bytes).unwrap();
    let restored = strategy.unmarshal(&mut reader, &registry).unwrap();
    as_person(&restored).unwrap()
}

#[test]
fn chain_round_trips_over_the_wire() {
    for strategy in [
        MarshallingStrategy::Tree,
        MarshallingStrategy::ReferenceById,
        MarshallingStrategy::ReferenceByPath,
    ] {
        let b = Person::handle("bob");
        let a = Person::handle("alice");
        a.borrow_mut().next = Some(b);
        let item: Handle = a;

        let bytes = write_bytes(strategy, &item);
        let restored = read_bytes(strategy, &bytes);
        assert_eq!(restored.borrow().name, "alice");
        let next = restored.borrow().next.clone().unwrap();
        assert_eq!(next.borrow().name, "bob");
        assert!(next.borrow().next.is_none());
    }
}

#[test]
fn self_cycle_survives_binary_transport() {
    for strategy in [
        MarshallingStrategy::ReferenceById,
        MarshallingStrategy::ReferenceByPath,
    ] {
        let a = Person::handle("ouroboros");
        a.borrow_mut().next = Some(a.clone());
        let item: Handle = a;

        let bytes = write_bytes(strategy, &item);
        let restored = read_bytes(strategy, &bytes);
        let next = restored.borrow().next.clone().unwrap();
        assert!(Rc::ptr_eq(&restored, &next));
    }
}

#[test]
fn long_chains_reuse_dictionary_entries() {
    let mut head = Person::handle("p0");
    for i in 1..10 {
        let next = Person::handle(&format!("p{i}"));
        next.borrow_mut().next = Some(head);
        head = next;
    }
    let item: Handle = head;

    let bytes = write_bytes(MarshallingStrategy::ReferenceById, &item);
    // Every name in the document is one of a handful of distinct strings, so
    // the stream must stay far smaller than one NameEntry per node would be.
    let name_entries = count_name_entries(&bytes);
    assert_eq!(name_entries, 5); // person, id, name, next, class

    let restored = read_bytes(MarshallingStrategy::ReferenceById, &bytes);
    assert_eq!(restored.borrow().name, "p9");
}

fn count_name_entries(bytes: &[u8]) -> usize {
    use refstream_binary::token::decode;
    use refstream_buffers::Reader;

    let mut input = Reader::new(bytes);
    let mut count = 0;
    while !input.is_empty() {
        if let refstream_binary::Token::NameEntry { .. } = decode(&mut input).unwrap() {
            count += 1;
        }
    }
    count
}

#[test]
fn truncated_stream_fails_cleanly() {
    let b = Person::handle("bob");
    let a = Person::handle("alice");
    a.borrow_mut().next = Some(b);
    let item: Handle = a;
    let bytes = write_bytes(MarshallingStrategy::ReferenceById, &item);

    let registry = registry();
    let result = BinaryReader::from_bytes(&bytes[..bytes.len() / 2]).and_then(|mut reader| {
        MarshallingStrategy::ReferenceById.unmarshal(&mut reader, &registry)
    });
    assert!(matches!(result, Err(StreamError::Malformed(_))));
}

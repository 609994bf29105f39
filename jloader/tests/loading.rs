//! Integration tests exercising the parser, symbol extractor and pipeline
//! together over hand-assembled class files, in lieu of golden fixtures
//! produced by a real `javac` (none ship with this repository).

use jloader::class_file::ClassFile;
use jloader::pipeline::{Located, Pipeline};
use jloader::symbols;

/// A minimal class: `public class p/Greeter extends java/lang/Object`, one
/// instance field `count:I`, one method `public static int answer()` whose
/// code is `bipush 42; ireturn`.
fn greeter_class_bytes() -> Vec<u8> {
    // Pool:
    //  1 Utf8 "p/Greeter"      2 Class->1
    //  3 Utf8 "java/lang/Object" 4 Class->3
    //  5 Utf8 "count"          6 Utf8 "I"
    //  7 Utf8 "answer"         8 Utf8 "()I"
    //  9 Utf8 "Code"
    let mut bytes = vec![0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x00, 0x00, 50];
    bytes.extend_from_slice(&10u16.to_be_bytes()); // constant_pool_count

    push_utf8(&mut bytes, "p/Greeter");
    bytes.extend_from_slice(&[7, 0, 1]); // #2 Class -> #1
    push_utf8(&mut bytes, "java/lang/Object");
    bytes.extend_from_slice(&[7, 0, 3]); // #4 Class -> #3
    push_utf8(&mut bytes, "count");
    push_utf8(&mut bytes, "I");
    push_utf8(&mut bytes, "answer");
    push_utf8(&mut bytes, "()I");
    push_utf8(&mut bytes, "Code");

    bytes.extend_from_slice(&0x0021u16.to_be_bytes()); // access_flags: public super
    bytes.extend_from_slice(&2u16.to_be_bytes()); // this_class
    bytes.extend_from_slice(&4u16.to_be_bytes()); // super_class
    bytes.extend_from_slice(&0u16.to_be_bytes()); // interfaces_count

    bytes.extend_from_slice(&1u16.to_be_bytes()); // fields_count
    bytes.extend_from_slice(&0x0000u16.to_be_bytes()); // package-private field
    bytes.extend_from_slice(&5u16.to_be_bytes()); // name_index "count"
    bytes.extend_from_slice(&6u16.to_be_bytes()); // descriptor_index "I"
    bytes.extend_from_slice(&0u16.to_be_bytes()); // attributes_count

    bytes.extend_from_slice(&1u16.to_be_bytes()); // methods_count
    bytes.extend_from_slice(&0x0009u16.to_be_bytes()); // public static
    bytes.extend_from_slice(&7u16.to_be_bytes()); // name_index "answer"
    bytes.extend_from_slice(&8u16.to_be_bytes()); // descriptor_index "()I"
    bytes.extend_from_slice(&1u16.to_be_bytes()); // attributes_count
    bytes.extend_from_slice(&9u16.to_be_bytes()); // name_index "Code"
    let mut code_attr = vec![];
    code_attr.extend_from_slice(&1u16.to_be_bytes()); // max_stack
    code_attr.extend_from_slice(&0u16.to_be_bytes()); // max_locals
    code_attr.extend_from_slice(&3u32.to_be_bytes()); // code_length
    code_attr.extend_from_slice(&[0x10, 0x2A, 0xAC]); // bipush 42; ireturn
    code_attr.extend_from_slice(&0u16.to_be_bytes()); // exception_table_length
    code_attr.extend_from_slice(&0u16.to_be_bytes()); // attributes_count
    bytes.extend_from_slice(&(code_attr.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&code_attr);

    bytes.extend_from_slice(&0u16.to_be_bytes()); // class attributes_count
    bytes
}

fn push_utf8(bytes: &mut Vec<u8>, s: &str) {
    bytes.push(1);
    bytes.extend_from_slice(&(s.len() as u16).to_be_bytes());
    bytes.extend_from_slice(s.as_bytes());
}

#[test]
fn parses_class_resolves_super_and_reports_size() {
    let bytes = greeter_class_bytes();
    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.this_class_name().unwrap(), "p/Greeter");
    assert_eq!(class.super_class_name().unwrap(), Some("java/lang/Object"));
    assert_eq!(class.size, bytes.len() as u64);
    assert_eq!(class.fields.len(), 1);
    assert_eq!(class.methods.len(), 1);
}

#[test]
fn extracts_class_field_and_method_symbols_in_declaration_order() {
    let bytes = greeter_class_bytes();
    let class = ClassFile::parse(&bytes).unwrap();
    let symbols = symbols::extract(&class).unwrap();

    let names: Vec<&str> = symbols.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["p.Greeter", "p.Greeter.count", "p.Greeter.answer"]);
    assert_eq!(symbols[1].value, Some(4)); // `I` is always 4 bytes
    assert_eq!(symbols[2].value, Some(3)); // 3-byte Code buffer
}

#[test]
fn pipeline_default_filters_keep_discovery_order() {
    let bytes = greeter_class_bytes();
    let class = ClassFile::parse(&bytes).unwrap();
    let extracted = symbols::extract(&class).unwrap();

    let located: Vec<Located> = extracted
        .into_iter()
        .map(|symbol| Located {
            source_file: "Greeter.class".into(),
            jar_entry: None,
            class_name: "p.Greeter".into(),
            symbol,
        })
        .collect();

    let pipeline = Pipeline::default();
    let rendered = pipeline.run(located);
    assert_eq!(rendered.len(), 3);
    assert!(rendered[0].1.contains('C'));
    assert!(rendered[2].1.contains('T'));
}

#[test]
fn rejects_truncated_input_with_truncated_error() {
    let bytes = vec![0xCA, 0xFE, 0xBA, 0xBE, 0x00];
    let err = ClassFile::parse(&bytes).unwrap_err();
    assert!(matches!(err, jloader::JvmError::Truncated { .. }));
}

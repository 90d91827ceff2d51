//! Queries and typed reads over parsed documents.

use libminyaml::{build_tree, parse, tokenize, ErrorKind, NodeId, TokenKind, Value, Warnings};
use rstest::rstest;

const KERNEL_METADATA: &str = "\
version : '1.8'
kernels:
  - name : kernel_a
    execution_env :
      grf_count : 128
      simd_size : 0x10
      has_barriers : true
      required_sub_group_size : -1
    payload_arguments :
      - arg_type : global_id_offset
        offset : 0
        size : 12
      - arg_type : arg_bypointer
        offset : 32
        size : 8
        addrmode : \"stateless\"
    user_attributes :
      intel_reqd_sub_group_size : [8, 16]
";

#[test]
fn test_navigate_kernel_metadata() {
    let doc = parse(KERNEL_METADATA).unwrap();
    let root = doc.root().unwrap();

    let version = doc.child(root, "version").unwrap();
    assert_eq!(doc.read_value(version), "'1.8'");
    assert_eq!(doc.read_value_unquoted(version), "1.8");

    let kernels = doc.child(root, "kernels").unwrap();
    assert_eq!(kernels.num_children, 1);
    let kernel = doc.first_child(kernels).unwrap();
    assert!(kernel.key.is_none());
    assert_eq!(doc.read_value(doc.child(kernel, "name").unwrap()), "kernel_a");

    let env = doc.child(kernel, "execution_env").unwrap();
    let keys: Vec<&str> = doc.children(env).map(|n| doc.read_key(n)).collect();
    assert_eq!(
        keys,
        ["grf_count", "simd_size", "has_barriers", "required_sub_group_size"]
    );

    let args = doc.child(kernel, "payload_arguments").unwrap();
    let sizes: Vec<u32> = doc
        .children(args)
        .filter_map(|arg| doc.child(arg, "size"))
        .filter_map(|size| doc.read_value_checked(size))
        .collect();
    assert_eq!(sizes, vec![12, 8]);
    let last = doc.last_child(args).unwrap();
    assert_eq!(doc.read_value_unquoted(doc.child(last, "addrmode").unwrap()), "stateless");
}

#[test]
fn test_typed_reads() {
    let doc = parse(KERNEL_METADATA).unwrap();

    let grf = doc.find_by_key_dfs("grf_count").unwrap();
    assert_eq!(doc.read_value_checked::<u8>(grf), Some(128));
    assert_eq!(doc.read_value_checked::<i8>(grf), None);

    let simd = doc.find_by_key_dfs("simd_size").unwrap();
    assert_eq!(doc.read_value_checked::<i32>(simd), Some(16));

    let barriers = doc.find_by_key_dfs("has_barriers").unwrap();
    assert_eq!(doc.read_value_checked::<bool>(barriers), Some(true));
    assert_eq!(doc.read_value_checked::<u32>(barriers), None);

    let sub_group = doc.find_by_key_dfs("required_sub_group_size").unwrap();
    assert_eq!(doc.read_value_checked::<i32>(sub_group), Some(-1));
    assert_eq!(doc.read_value_checked::<u32>(sub_group), None);

    let sizes = doc.find_by_key_dfs("intel_reqd_sub_group_size").unwrap();
    assert_eq!(doc.read_value_checked::<u32>(sizes), None);
    let widths: Vec<u32> = doc
        .children(sizes)
        .filter_map(|n| doc.read_value_checked(n))
        .collect();
    assert_eq!(widths, vec![8, 16]);
}

#[test]
fn test_int32_hex_range() {
    let doc = parse("fits : 0x1234ABCD\nwide : 0x123456789ABCDEF\n").unwrap();
    let fits = doc.find_by_key_dfs("fits").unwrap();
    let wide = doc.find_by_key_dfs("wide").unwrap();

    assert_eq!(doc.read_value_checked::<i32>(fits), Some(0x1234ABCD));
    assert_eq!(doc.read_value_checked::<i32>(wide), None);
    assert_eq!(doc.read_value_checked::<i64>(wide), Some(0x123456789ABCDEF));
}

#[rstest]
#[case("y", Some(true))]
#[case("YES", Some(true))]
#[case("True", Some(true))]
#[case("ON", Some(true))]
#[case("N", Some(false))]
#[case("No", Some(false))]
#[case("FALSE", Some(false))]
#[case("Off", Some(false))]
#[case("1", None)]
#[case("0", None)]
#[case("yess", None)]
#[case("tru", None)]
fn test_bool_read(#[case] text: &str, #[case] expected: Option<bool>) {
    let source = format!("flag : {}\n", text);
    let doc = parse(&source).unwrap();
    let flag = doc.find_by_key_dfs("flag").unwrap();
    assert_eq!(doc.read_value_checked::<bool>(flag), expected);
}

#[test]
fn test_bool_read_fails_on_containers_and_empty_values() {
    let doc = parse("flags : [true, false]\nlist :\n  - yes\nempty :\n").unwrap();
    for key in ["flags", "list", "empty"] {
        let node = doc.find_by_key_dfs(key).unwrap();
        assert_eq!(doc.read_value_checked::<bool>(node), None, "{}", key);
    }
}

#[test]
fn test_flat_dictionary_round_trip() {
    let source = "apple : red\nbanana : yellow\norange : orange\n";
    let doc = parse(source).unwrap();
    let root = doc.root().unwrap();
    assert_eq!(root.num_children, 3);

    let mut visited = Vec::new();
    for node in doc.children(root) {
        let key = &doc.tokens()[node.key.unwrap()];
        let value = &doc.tokens()[node.value.unwrap()];
        assert_eq!(&source[key.pos..key.pos + key.len()], key.text);
        assert_eq!(&source[value.pos..value.pos + value.len()], value.text);
        visited.push((key.text, value.text));
    }
    assert_eq!(
        visited,
        [("apple", "red"), ("banana", "yellow"), ("orange", "orange")]
    );
}

#[test]
fn test_sibling_linkage() {
    let doc = parse("a :\n  - 1\n  - 2\n  - 3\n").unwrap();
    let a = doc.find_by_key_dfs("a").unwrap();
    let mut ids: Vec<NodeId> = Vec::new();
    let mut next = a.first_child;
    while let Some(id) = next {
        let node = doc.node(id).unwrap();
        assert_eq!(node.parent, Some(a.id));
        ids.push(id);
        next = node.next_sibling;
    }
    assert_eq!(ids.len(), a.num_children);
    assert_eq!(ids.last().copied(), a.last_child);
}

#[test]
fn test_value_token_kinds() {
    let doc = parse("n : -4.5\ns : \"x\"\nw : word\n").unwrap();
    let kind = |key| doc.value_token(doc.find_by_key_dfs(key).unwrap()).map(|t| t.kind);
    assert_eq!(kind("n"), Some(TokenKind::LiteralNumber));
    assert_eq!(kind("s"), Some(TokenKind::LiteralString));
    assert_eq!(kind("w"), Some(TokenKind::LiteralString));
}

#[test]
fn test_bad_indentation_is_a_tree_error() {
    let source = "    - red\n   - green\n  - blue\n";
    let mut warnings = Warnings::new();
    let scan = tokenize(source, &mut warnings).unwrap();
    assert_eq!(scan.lines.len(), 3);

    let err = build_tree(&scan, &mut warnings).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidIndentation);
    assert_eq!(err.line, 1);
}

#[test]
fn test_project_whole_document() {
    let doc = parse(KERNEL_METADATA).unwrap();
    let value = Value::from_node(&doc, doc.root().unwrap()).unwrap();

    assert_eq!(value.get("version").and_then(Value::as_str), Some("1.8"));
    let kernel = &value.get("kernels").and_then(Value::as_array).unwrap()[0];
    let env = kernel.get("execution_env").unwrap();
    assert_eq!(env.get("simd_size"), Some(&Value::from(16)));
    assert_eq!(env.get("has_barriers"), Some(&Value::from(true)));
    assert_eq!(env.get("required_sub_group_size"), Some(&Value::from(-1)));
    let sizes = kernel
        .get("user_attributes")
        .and_then(|attrs| attrs.get("intel_reqd_sub_group_size"))
        .and_then(Value::as_array)
        .unwrap();
    assert_eq!(sizes, &[Value::from(8), Value::from(16)]);
}

use archetyper::encoding::Charset;
use archetyper::error::Error;
use archetyper::properties::PropertyBag;
use archetyper::renderer::{render_content, templatize, PlaceholderRenderer, TemplateRenderer};

fn properties(pairs: &[(&str, &str)]) -> PropertyBag {
    pairs.iter().copied().collect()
}

#[test]
fn test_known_placeholders_are_substituted() {
    let renderer = PlaceholderRenderer::new();
    let props = properties(&[("artifactId", "demo"), ("version", "1.0")]);
    let result = renderer.render("<artifactId>${artifactId}</artifactId>${version}", &props);
    assert_eq!(result.unwrap(), "<artifactId>demo</artifactId>1.0");
}

#[test]
fn test_unknown_placeholders_pass_through() {
    let renderer = PlaceholderRenderer::new();
    let props = properties(&[("name", "world")]);
    let template = "Hello ${name}, ${unknown} uses ${project.build.sourceEncoding} and $name";
    assert_eq!(
        renderer.render(template, &props).unwrap(),
        "Hello world, ${unknown} uses ${project.build.sourceEncoding} and $name"
    );
}

#[test]
fn test_rendering_is_idempotent_without_placeholders_in_values() {
    let renderer = PlaceholderRenderer::new();
    let props = properties(&[("groupId", "com.example")]);
    let once = renderer.render("package ${groupId}; // ${other}", &props).unwrap();
    let twice = renderer.render(&once, &props).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_values_are_not_rendered_again() {
    let renderer = PlaceholderRenderer::new();
    let props = properties(&[("a", "${b}"), ("b", "x")]);
    assert_eq!(renderer.render("${a}", &props).unwrap(), "${b}");
}

#[test]
fn test_render_content_keeps_single_byte_encoding() {
    let charset = Charset::for_label("ISO-8859-1").unwrap();
    let props = properties(&[("name", "\u{e9}t\u{e9}")]);
    let source = b"caf\xe9 ${name}";
    let rendered = render_content(source, &charset, &props, &PlaceholderRenderer::new()).unwrap();
    assert_eq!(rendered, b"caf\xe9 \xe9t\xe9".to_vec());
}

#[test]
fn test_render_content_ascii_is_seven_bit() {
    let charset = Charset::for_label("US-ASCII").unwrap();
    let renderer = PlaceholderRenderer::new();

    let props = properties(&[("name", "demo")]);
    let rendered = render_content(b"name=${name}", &charset, &props, &renderer).unwrap();
    assert_eq!(rendered, b"name=demo".to_vec());

    let props = properties(&[("name", "caf\u{e9}")]);
    match render_content(b"name=${name}", &charset, &props, &renderer) {
        Err(Error::MalformedContentError { encoding }) => assert_eq!(encoding, "US-ASCII"),
        other => panic!("Expected MalformedContentError, got {other:?}"),
    }
    assert!(matches!(
        render_content(b"caf\xe9", &charset, &props, &renderer),
        Err(Error::MalformedContentError { .. })
    ));
}

#[test]
fn test_render_content_latin1_maps_bytes_one_to_one() {
    let charset = Charset::for_label("ISO-8859-1").unwrap();
    let renderer = PlaceholderRenderer::new();

    // C1 controls survive instead of turning into windows-1252 punctuation
    let props = properties(&[("price", "5")]);
    let rendered = render_content(b"\x80\x9f ${price}", &charset, &props, &renderer).unwrap();
    assert_eq!(rendered, b"\x80\x9f 5".to_vec());

    let props = properties(&[("price", "\u{20ac}5")]);
    match render_content(b"price=${price}", &charset, &props, &renderer) {
        Err(Error::MalformedContentError { encoding }) => assert_eq!(encoding, "ISO-8859-1"),
        other => panic!("Expected MalformedContentError, got {other:?}"),
    }
}

#[test]
fn test_render_content_keeps_utf8_multibyte_and_bom() {
    let charset = Charset::utf8();
    let props = properties(&[("name", "\u{65e5}\u{672c}")]);
    let source = "\u{feff}\u{00e9}\u{1f600} ${name}".as_bytes();
    let rendered = render_content(source, &charset, &props, &PlaceholderRenderer::new()).unwrap();
    assert_eq!(rendered, "\u{feff}\u{00e9}\u{1f600} \u{65e5}\u{672c}".as_bytes().to_vec());
}

#[test]
fn test_render_content_utf16() {
    let charset = Charset::for_label("UTF-16LE").unwrap();
    let props = properties(&[("x", "\u{e9}")]);
    let source: Vec<u8> = "A${x}".encode_utf16().flat_map(u16::to_le_bytes).collect();
    let rendered = render_content(&source, &charset, &props, &PlaceholderRenderer::new()).unwrap();
    let expected: Vec<u8> = "A\u{e9}".encode_utf16().flat_map(u16::to_le_bytes).collect();
    assert_eq!(rendered, expected);
}

#[test]
fn test_render_content_rejects_malformed_input() {
    let props = properties(&[]);
    let source = [0x66, 0xff, 0xfe];
    let result = render_content(&source, &Charset::utf8(), &props, &PlaceholderRenderer);
    match result {
        Err(Error::MalformedContentError { encoding }) => assert_eq!(encoding, "UTF-8"),
        other => panic!("Expected MalformedContentError, got {other:?}"),
    }
}

#[test]
fn test_render_content_rejects_unmappable_values() {
    let charset = Charset::for_label("ISO-8859-1").unwrap();
    let props = properties(&[("name", "\u{65e5}")]);
    let result = render_content(b"${name}", &charset, &props, &PlaceholderRenderer::new());
    assert!(matches!(result, Err(Error::MalformedContentError { .. })));
}

#[test]
fn test_templatize_prefers_longest_value() {
    let props = properties(&[("groupId", "com.example"), ("package", "com.example.app")]);
    let text = "import com.example.app.Main; // com.example";
    assert_eq!(
        templatize(text, &props, &[], None).unwrap(),
        "import ${package}.Main; // ${groupId}"
    );
}

#[test]
fn test_templatize_shared_values() {
    let props = properties(&[("groupId", "com.example"), ("package", "com.example")]);
    let text = "com.example";
    assert_eq!(templatize(text, &props, &[], None).unwrap(), "${groupId}");
    assert_eq!(templatize(text, &props, &[], Some("package")).unwrap(), "${package}");
    assert_eq!(templatize(text, &props, &[], Some("groupId")).unwrap(), "${groupId}");
}

#[test]
fn test_templatize_skips_keys_and_empty_values() {
    let props = properties(&[
        ("package", "com.example"),
        ("packageInPathFormat", "com/example"),
        ("empty", ""),
    ]);
    let text = "com/example/App.java in com.example";
    assert_eq!(
        templatize(text, &props, &["packageInPathFormat"], None).unwrap(),
        "com/example/App.java in ${package}"
    );
}

#[test]
fn test_templatize_then_render_restores_text() {
    let props = properties(&[("artifactId", "demo"), ("version", "1.0-SNAPSHOT")]);
    let text = "<artifactId>demo</artifactId><version>1.0-SNAPSHOT</version>";
    let template = templatize(text, &props, &[], None).unwrap();
    assert_eq!(template, "<artifactId>${artifactId}</artifactId><version>${version}</version>");
    assert_eq!(PlaceholderRenderer::new().render(&template, &props).unwrap(), text);
}

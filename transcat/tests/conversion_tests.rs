//! End-to-end pipeline tests: real files in, real files out.

use std::fs;

use indoc::indoc;
use transcat::{Error, convert};

#[test]
fn test_convert_po_to_json() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("fr.po");
    let output = tmp.path().join("fr.json");

    fs::write(
        &input,
        indoc! {r#"
            msgid ""
            msgstr "Language: fr\n"

            msgid "Hello"
            msgstr "Bonjour"

            msgid "Goodbye"
            msgstr "Au revoir"
        "#},
    )
    .unwrap();

    convert(output.clone(), &[input], None).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    let object: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(object["Hello"], "Bonjour");
    assert_eq!(object["Goodbye"], "Au revoir");
}

#[test]
fn test_convert_concatenates_inputs_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    let first = tmp.path().join("first.properties");
    let second = tmp.path().join("second.properties");
    let output = tmp.path().join("merged.properties");

    fs::write(&first, "a=1\nb=2\n").unwrap();
    fs::write(&second, "c=3\n").unwrap();

    convert(output.clone(), &[first, second], None).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(written, "a=1\nb=2\nc=3\n");
}

#[test]
fn test_convert_with_template_rekeys_output() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("fr.po");
    let template = tmp.path().join("keys.properties");
    let output = tmp.path().join("fr.properties");

    fs::write(
        &input,
        indoc! {r#"
            msgid "Hello"
            msgstr "Bonjour"
        "#},
    )
    .unwrap();
    fs::write(&template, "msg.greeting=Hello\n").unwrap();

    convert(output.clone(), &[input], Some(template)).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(written, "msg.greeting=Bonjour\n");
}

#[test]
fn test_convert_tmx_input_to_json() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("memory.tmx");
    let output = tmp.path().join("out.json");

    fs::write(
        &input,
        indoc! {r#"
            <tmx version="1.4">
                <header srclang="en"/>
                <body>
                    <tu>
                        <tuv xml:lang="en"><seg>Hello</seg></tuv>
                        <tuv xml:lang="fr"><seg>Bonjour</seg></tuv>
                    </tu>
                </body>
            </tmx>
        "#},
    )
    .unwrap();

    convert(output.clone(), &[input], None).unwrap();
    let object: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(object["Hello"], "Bonjour");
}

#[test]
fn test_convert_unknown_input_extension_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("notes.txt");
    let output = tmp.path().join("out.json");
    fs::write(&input, "whatever").unwrap();

    let error = convert(output.clone(), &[input], None).unwrap_err();
    assert!(matches!(error, Error::UnknownFormat(_)));
    assert!(!output.exists());
}

#[test]
fn test_convert_unknown_output_extension_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("a.properties");
    let output = tmp.path().join("out.nope");
    fs::write(&input, "a=1\n").unwrap();

    let error = convert(output.clone(), &[input], None).unwrap_err();
    assert!(matches!(error, Error::UnknownFormat(_)));
    assert!(!output.exists());
}

#[test]
fn test_decode_failure_leaves_existing_output_untouched() {
    let tmp = tempfile::tempdir().unwrap();
    let good = tmp.path().join("good.properties");
    let bad = tmp.path().join("bad.po");
    let output = tmp.path().join("out.json");

    fs::write(&good, "a=1\n").unwrap();
    fs::write(&bad, "msgid \"unterminated\n").unwrap();
    fs::write(&output, "{ \"untouched\": \"yes\" }").unwrap();

    let error = convert(output.clone(), &[good, bad], None).unwrap_err();
    let message = error.to_string();
    assert!(message.contains("bad.po"), "error names the file: {}", message);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "{ \"untouched\": \"yes\" }"
    );
}

#[test]
fn test_encode_failure_writes_no_output() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("a.properties");
    // TS output needs a language, which a properties file cannot supply
    let output = tmp.path().join("out.ts");
    fs::write(&input, "a=1\n").unwrap();

    let error = convert(output.clone(), &[input], None).unwrap_err();
    assert!(error.to_string().contains("language"));
    assert!(!output.exists());
}

#[test]
fn test_cross_format_preserves_key_and_value() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("fr.po");
    let middle = tmp.path().join("fr.properties");
    let output = tmp.path().join("fr.json");

    fs::write(
        &input,
        indoc! {r#"
            #, fuzzy
            msgid "Hello"
            msgstr "Bonjour"

            msgctxt "farewell"
            msgid "Goodbye"
            msgstr "Au revoir"
        "#},
    )
    .unwrap();

    convert(middle.clone(), &[input], None).unwrap();
    convert(output.clone(), &[middle], None).unwrap();

    let object: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(object["Hello"], "Bonjour");
    assert_eq!(object["Goodbye"], "Au revoir");
}

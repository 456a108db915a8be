use super::*;

#[test]
fn json_is_sniffed_from_leading_brace() {
    assert!(looks_like_json("  \n{\"type\":\"excalidraw\"}"));
    assert!(!looks_like_json("```sketch\nrect\n```\n"));
    assert!(!looks_like_json(""));
}

#[test]
fn convert_arguments_parse() {
    let cli = Cli::try_parse_from(["markdraw", "convert", "in.md", "-o", "out.excalidraw", "--to", "excalidraw"]).unwrap();
    match cli.command {
        Command::Convert(args) => {
            assert_eq!(args.input, "in.md");
            assert_eq!(args.output, Some(PathBuf::from("out.excalidraw")));
            assert_eq!(args.to, Some(DocumentFormat::Excalidraw));
        }
        other => panic!("expected convert, got {other:?}"),
    }
}

#[test]
fn check_defaults_to_stdin() {
    let cli = Cli::try_parse_from(["markdraw", "check", "--strict"]).unwrap();
    match cli.command {
        Command::Check(args) => {
            assert_eq!(args.input, "-");
            assert!(args.strict);
        }
        other => panic!("expected check, got {other:?}"),
    }
}

#[test]
fn library_dialect_values() {
    let cli = Cli::try_parse_from(["markdraw", "library", "lib.txt", "--to", "excalidrawlib"]).unwrap();
    assert!(matches!(cli.command, Command::Library(LibraryArgs { to: Some(LibraryFormat::Excalidrawlib), .. })));
    assert!(Cli::try_parse_from(["markdraw", "library", "lib.txt", "--to", "zip"]).is_err());
}

#[test]
fn documents_render_in_both_formats() {
    let doc = parse_document("```sketch\nrect id=a seed=1\n```\n").value;
    let config = CodecConfig::default();
    assert_eq!(render_document(&doc, DocumentFormat::Md, &config), "```sketch\nrect id=a at 0,0 size 100x100 seed=1\n```\n");
    let json = render_document(&doc, DocumentFormat::Excalidraw, &config);
    assert!(json.starts_with('{'));
    assert_eq!(parse_excalidraw(&json).value.element_count(), 1);
}

use std::io::{Cursor, Read};

use office_from_html::{
    convert, convert_to_bytes, render, Block, Conversion, ConvertOptions, ImageSource, MathContent, SourceKind,
    StyledRun, TargetFormat,
};

fn part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let mut s = String::new();
    archive.by_name(name).unwrap().read_to_string(&mut s).unwrap();
    s
}

fn blocks(source: &str, kind: SourceKind, target: TargetFormat) -> Vec<Block> {
    match convert(source, kind, target) {
        Conversion::Document(doc) => doc.into_blocks(),
        Conversion::Empty => panic!("unexpected empty conversion"),
    }
}

const SAMPLE: &str = r#"
<h1>Quarterly report</h1>
<p>Revenue grew <strong>12%</strong>, see <a href="https://example.com/q3">details</a>.</p>
<span class="math" data-math="E = mc^2"></span>
<pre><code class="language-rust">fn main() {}</code></pre>
<table>
  <tr><th>Region</th><th>Sales</th></tr>
  <tr><td>North</td><td>10</td><td>extra</td></tr>
  <tr><td>South</td></tr>
</table>
<ul><li>alpha<ul><li>beta</li></ul></li></ul>
<img src="chart.png" alt="Chart">
"#;

#[test]
fn sample_becomes_blocks_in_order() {
    let blocks = blocks(SAMPLE, SourceKind::Html, TargetFormat::Docx);
    assert_eq!(blocks.len(), 7);
    assert!(matches!(&blocks[0], Block::Heading { level: 1, text } if text == "Quarterly report"));
    match &blocks[1] {
        Block::Paragraph(runs) => {
            assert!(runs.iter().any(|r| r.text == "12%" && r.style.bold));
            assert!(runs
                .iter()
                .any(|r| r.text == "details" && r.href.as_deref() == Some("https://example.com/q3")));
        }
        other => panic!("expected paragraph, got {:?}", other),
    }
    match &blocks[2] {
        Block::Math(m) => assert!(matches!(m.content, MathContent::Omml(_))),
        other => panic!("expected math, got {:?}", other),
    }
    match &blocks[3] {
        Block::CodeBlock(code) => {
            assert_eq!(code.language.as_deref(), Some("rust"));
            assert!(code.highlighted);
        }
        other => panic!("expected code, got {:?}", other),
    }
    match &blocks[4] {
        Block::Table(t) => {
            assert_eq!(t.columns, 2);
            assert!(t.rows.iter().all(|r| r.len() == 2));
            assert!(t.rows[0].iter().all(|c| c.header));
            assert_eq!(t.rows[2][1].text(), "");
        }
        other => panic!("expected table, got {:?}", other),
    }
    match &blocks[5] {
        Block::List(list) => {
            assert_eq!(list.items.len(), 2);
            assert_eq!((list.items[0].level, list.items[1].level), (0, 1));
        }
        other => panic!("expected list, got {:?}", other),
    }
    assert!(matches!(&blocks[6], Block::Image(img) if img.alt.as_deref() == Some("Chart")));
}

#[test]
fn math_is_linear_outside_docx() {
    let blocks = blocks(r#"<span class="math">E = mc^2</span>"#, SourceKind::Html, TargetFormat::Pptx);
    match &blocks[0] {
        Block::Math(m) => assert_eq!(m.content, MathContent::Linear("E=mc^2".to_string())),
        other => panic!("expected math, got {:?}", other),
    }
}

#[test]
fn broken_math_falls_back_to_source_text() {
    let blocks = blocks(r#"<span class="math">\frac{a</span>"#, SourceKind::Html, TargetFormat::Docx);
    match &blocks[0] {
        Block::Math(m) => assert_eq!(m.content, MathContent::Fallback("[Math: \\frac{a]".to_string())),
        other => panic!("expected math, got {:?}", other),
    }
}

#[test]
fn markdown_display_math_and_code() {
    let md = "Intro\n\n$$\\sqrt{x}$$\n\n```python\nx = 1\n```\n";
    let blocks = blocks(md, SourceKind::Markdown, TargetFormat::Docx);
    assert_eq!(blocks[0], Block::Paragraph(vec![StyledRun::plain("Intro")]));
    assert!(matches!(&blocks[1], Block::Math(m) if m.source == "\\sqrt{x}"));
    assert!(matches!(&blocks[2], Block::CodeBlock(c) if c.text == "x = 1" && c.language.as_deref() == Some("python")));
}

#[test]
fn markdown_code_keeps_math_delimiters() {
    let fenced = blocks("~~~\ncost: $$x$$\n~~~\n", SourceKind::Markdown, TargetFormat::Docx);
    assert_eq!(fenced.len(), 1);
    assert!(matches!(&fenced[0], Block::CodeBlock(c) if c.text == "cost: $$x$$"));

    let indented = blocks("    indented $$y$$ code\n", SourceKind::Markdown, TargetFormat::Docx);
    assert_eq!(indented.len(), 1);
    assert!(matches!(&indented[0], Block::CodeBlock(c) if c.text == "indented $$y$$ code"));
}

#[test]
fn docx_package_has_the_expected_parts() {
    let bytes = convert_to_bytes(SAMPLE, SourceKind::Html, TargetFormat::Docx, &ConvertOptions::default())
        .unwrap()
        .unwrap();
    let doc = part(&bytes, "word/document.xml");
    assert!(doc.contains("Quarterly report"));
    assert!(doc.contains("<m:oMathPara>"));
    assert!(doc.contains("<w:hyperlink "));
    assert!(doc.contains("[Image: Chart]"));
    assert_eq!(doc.matches("<w:gridCol ").count(), 2);

    let rels = part(&bytes, "word/_rels/document.xml.rels");
    assert!(rels.contains("https://example.com/q3"));
    assert!(part(&bytes, "[Content_Types].xml").contains("wordprocessingml.document.main+xml"));
    assert!(part(&bytes, "word/numbering.xml").contains("w:abstractNum"));
}

#[test]
fn output_is_deterministic() {
    let options = ConvertOptions::default().with_title("Same");
    for target in [TargetFormat::Docx, TargetFormat::Pptx, TargetFormat::Pdf] {
        let a = convert_to_bytes(SAMPLE, SourceKind::Html, target, &options).unwrap();
        let b = convert_to_bytes(SAMPLE, SourceKind::Html, target, &options).unwrap();
        assert_eq!(a, b, "{:?}", target);
    }
}

struct OneImage;

impl ImageSource for OneImage {
    fn load(&self, src: &str) -> Option<Vec<u8>> {
        if src != "chart.png" {
            return None;
        }
        let mut b = b"\x89PNG\r\n\x1a\n".to_vec();
        b.extend_from_slice(&13u32.to_be_bytes());
        b.extend_from_slice(b"IHDR");
        b.extend_from_slice(&800u32.to_be_bytes());
        b.extend_from_slice(&600u32.to_be_bytes());
        b.extend_from_slice(&[8, 6, 0, 0, 0]);
        Some(b)
    }
}

#[test]
fn pptx_deck_embeds_resolved_images() {
    let options = ConvertOptions::default();
    let doc = convert(SAMPLE, SourceKind::Html, TargetFormat::Pptx).document().unwrap();
    let bytes = render(&doc, &options, &OneImage).unwrap();

    let presentation = part(&bytes, "ppt/presentation.xml");
    assert!(presentation.contains("<p:sldSz cx=\"12192000\" cy=\"6858000\"/>"));
    let slides: String = (1..=presentation.matches("<p:sldId ").count())
        .map(|i| part(&bytes, &format!("ppt/slides/slide{}.xml", i)))
        .collect();
    assert!(slides.contains("Quarterly report"));
    assert!(slides.contains("<a:tbl>"));
    assert!(slides.contains("<p:pic>"));
    assert!(slides.contains("E=mc^2"));
}

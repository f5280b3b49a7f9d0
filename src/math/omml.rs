//! MathML tree → Office Math (OMML) markup for WordprocessingML.

use super::mathml::{accent_mark, presentation_children, MathNode};
use crate::writer::xml::escape_text;

/// Display-mode equation: `<m:oMathPara><m:oMath>..</m:oMath></m:oMathPara>`.
pub fn to_omml_para(root: &MathNode) -> String {
    format!("<m:oMathPara><m:oMath>{}</m:oMath></m:oMathPara>", children(root))
}

fn children(node: &MathNode) -> String {
    presentation_children(node).map(element).collect()
}

fn nth(node: &MathNode, i: usize) -> String {
    presentation_children(node).nth(i).map(element).unwrap_or_default()
}

fn run(text: &str, upright: bool) -> String {
    if text.is_empty() {
        return String::new();
    }
    let rpr = if upright {
        "<m:rPr><m:sty m:val=\"p\"/></m:rPr>"
    } else {
        ""
    };
    format!(
        "<m:r>{}<m:t xml:space=\"preserve\">{}</m:t></m:r>",
        rpr,
        escape_text(text)
    )
}

fn is_stretchy_fence(node: &MathNode) -> bool {
    node.name == "mo" && node.attr("stretchy") == Some("true")
}

/// `\left( .. \right)` comes out as an mrow bracketed by stretchy operators.
fn fenced_row(node: &MathNode) -> Option<String> {
    let kids: Vec<&MathNode> = presentation_children(node).collect();
    if kids.len() < 2 {
        return None;
    }
    let (first, last) = (kids[0], kids[kids.len() - 1]);
    if !is_stretchy_fence(first) || !is_stretchy_fence(last) {
        return None;
    }
    let body: String = kids[1..kids.len() - 1].iter().map(|k| element(k)).collect();
    Some(delimiter(first.text.trim(), last.text.trim(), &[body]))
}

fn delimiter(open: &str, close: &str, items: &[String]) -> String {
    // "." is the invisible fence of \left. / \right.
    let chr = |c: &str| if c == "." { String::new() } else { escape_text(c) };
    let mut out = format!(
        "<m:d><m:dPr><m:begChr m:val=\"{}\"/><m:endChr m:val=\"{}\"/></m:dPr>",
        chr(open),
        chr(close)
    );
    for item in items {
        out.push_str("<m:e>");
        out.push_str(item);
        out.push_str("</m:e>");
    }
    out.push_str("</m:d>");
    out
}

fn element(node: &MathNode) -> String {
    match node.name.as_str() {
        "mi" => {
            let upright = node.attr("mathvariant") == Some("normal")
                || node.text.trim().chars().count() > 1;
            run(node.text.trim(), upright)
        }
        "mn" | "mo" => run(node.text.trim(), false),
        "mtext" | "ms" => run(&node.text, true),
        "mspace" => run(" ", false),
        "mphantom" | "annotation" | "annotation-xml" => String::new(),
        "semantics" => nth(node, 0),
        "mrow" => fenced_row(node).unwrap_or_else(|| children(node)),
        "msup" => format!(
            "<m:sSup><m:e>{}</m:e><m:sup>{}</m:sup></m:sSup>",
            nth(node, 0),
            nth(node, 1)
        ),
        "msub" => format!(
            "<m:sSub><m:e>{}</m:e><m:sub>{}</m:sub></m:sSub>",
            nth(node, 0),
            nth(node, 1)
        ),
        "msubsup" => format!(
            "<m:sSubSup><m:e>{}</m:e><m:sub>{}</m:sub><m:sup>{}</m:sup></m:sSubSup>",
            nth(node, 0),
            nth(node, 1),
            nth(node, 2)
        ),
        "mfrac" => {
            let fpr = if matches!(node.attr("linethickness"), Some("0" | "0px" | "0pt" | "0em")) {
                "<m:fPr><m:type m:val=\"noBar\"/></m:fPr>"
            } else {
                ""
            };
            format!(
                "<m:f>{}<m:num>{}</m:num><m:den>{}</m:den></m:f>",
                fpr,
                nth(node, 0),
                nth(node, 1)
            )
        }
        "msqrt" => format!(
            "<m:rad><m:radPr><m:degHide m:val=\"1\"/></m:radPr><m:deg/><m:e>{}</m:e></m:rad>",
            children(node)
        ),
        "mroot" => format!(
            "<m:rad><m:deg>{}</m:deg><m:e>{}</m:e></m:rad>",
            nth(node, 1),
            nth(node, 0)
        ),
        "munder" => format!(
            "<m:limLow><m:e>{}</m:e><m:lim>{}</m:lim></m:limLow>",
            nth(node, 0),
            nth(node, 1)
        ),
        "mover" => {
            let over = presentation_children(node)
                .nth(1)
                .filter(|o| o.name == "mo")
                .and_then(|o| accent_mark(&o.text));
            match over {
                Some(mark) => format!(
                    "<m:acc><m:accPr><m:chr m:val=\"{}\"/></m:accPr><m:e>{}</m:e></m:acc>",
                    mark,
                    nth(node, 0)
                ),
                None => format!(
                    "<m:limUpp><m:e>{}</m:e><m:lim>{}</m:lim></m:limUpp>",
                    nth(node, 0),
                    nth(node, 1)
                ),
            }
        }
        "munderover" => format!(
            "<m:limUpp><m:e><m:limLow><m:e>{}</m:e><m:lim>{}</m:lim></m:limLow></m:e><m:lim>{}</m:lim></m:limUpp>",
            nth(node, 0),
            nth(node, 1),
            nth(node, 2)
        ),
        "mfenced" => {
            let items: Vec<String> = presentation_children(node).map(element).collect();
            delimiter(
                node.attr("open").unwrap_or("("),
                node.attr("close").unwrap_or(")"),
                &items,
            )
        }
        "mtable" => {
            let mut out = String::from("<m:m>");
            for row in presentation_children(node) {
                out.push_str("<m:mr>");
                for cell in presentation_children(row) {
                    out.push_str("<m:e>");
                    out.push_str(&children(cell));
                    out.push_str("</m:e>");
                }
                out.push_str("</m:mr>");
            }
            out.push_str("</m:m>");
            out
        }
        _ => {
            // mstyle, mpadded, menclose, unknown wrappers: keep the content.
            let mut out = run(&node.text, false);
            out.push_str(&children(node));
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::mathml::parse_mathml;

    fn omml(mathml: &str) -> String {
        to_omml_para(&parse_mathml(mathml).unwrap())
    }

    #[test]
    fn superscripts_and_fractions() {
        let out = omml("<math><mi>E</mi><mo>=</mo><mi>m</mi><msup><mi>c</mi><mn>2</mn></msup></math>");
        assert!(out.starts_with("<m:oMathPara><m:oMath>"));
        assert!(out.contains("<m:sSup><m:e><m:r><m:t xml:space=\"preserve\">c</m:t></m:r></m:e><m:sup><m:r><m:t xml:space=\"preserve\">2</m:t></m:r></m:sup></m:sSup>"));

        let frac = omml("<math><mfrac><mi>a</mi><mi>b</mi></mfrac></math>");
        assert!(frac.contains("<m:f><m:num>"));
        assert!(frac.contains("</m:num><m:den>"));
    }

    #[test]
    fn radicals_accents_and_functions() {
        let out = omml("<math><msqrt><mi>x</mi></msqrt><mroot><mi>y</mi><mn>3</mn></mroot><mover><mi>v</mi><mo>→</mo></mover><mi>sin</mi></math>");
        assert!(out.contains("<m:degHide m:val=\"1\"/>"));
        assert!(out.contains("<m:deg><m:r><m:t xml:space=\"preserve\">3</m:t></m:r></m:deg>"));
        assert!(out.contains("<m:acc><m:accPr><m:chr m:val=\"\u{20D7}\"/>"));
        assert!(out.contains("<m:rPr><m:sty m:val=\"p\"/></m:rPr><m:t xml:space=\"preserve\">sin</m:t>"));
    }

    #[test]
    fn stretchy_fences_become_delimiters() {
        let out = omml(r#"<math><mrow><mo stretchy="true">(</mo><mi>x</mi><mo stretchy="true">)</mo></mrow></math>"#);
        assert!(out.contains("<m:d><m:dPr><m:begChr m:val=\"(\"/><m:endChr m:val=\")\"/></m:dPr><m:e>"));
    }

    #[test]
    fn matrices() {
        let out = omml("<math><mtable><mtr><mtd><mn>1</mn></mtd><mtd><mn>0</mn></mtd></mtr></mtable></math>");
        assert!(out.contains("<m:m><m:mr><m:e>"));
        assert_eq!(out.matches("<m:e>").count(), 2);
    }

    #[test]
    fn escapes_operator_text() {
        let out = omml("<math><mi>a</mi><mo>&lt;</mo><mi>b</mi></math>");
        assert!(out.contains("&lt;"));
        assert!(!out.contains("<</"));
    }
}

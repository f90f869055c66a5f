use once_cell::sync::Lazy;
use regex::Regex;

static INLINE_WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static NEWLINE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n]+").unwrap());
static REPEATED_PERIOD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").unwrap());
static REPEATED_BANG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!{2,}").unwrap());
static REPEATED_QUESTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\?{2,}").unwrap());
static TERMINATOR_THEN_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.!?])(\w)").unwrap());
static MULTI_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

/// A named pure transform. Every pass is idempotent on its own output, and
/// the full ordered sequence stays idempotent as a whole; later passes rely
/// on the output shape of earlier ones, so the order in `PASSES` is fixed.
#[derive(Clone, Copy)]
pub struct NormalizationPass {
    pub name: &'static str,
    run: fn(&str) -> String,
}

impl NormalizationPass {
    pub fn apply(&self, text: &str) -> String {
        (self.run)(text)
    }
}

pub static PASSES: [NormalizationPass; 8] = [
    NormalizationPass {
        name: "collapse-inline-whitespace",
        run: collapse_inline_whitespace,
    },
    NormalizationPass {
        name: "collapse-newlines",
        run: collapse_newlines,
    },
    NormalizationPass {
        name: "strip-control-characters",
        run: strip_control_characters,
    },
    NormalizationPass {
        name: "straighten-quotes",
        run: straighten_quotes,
    },
    NormalizationPass {
        name: "collapse-repeated-terminators",
        run: collapse_repeated_terminators,
    },
    NormalizationPass {
        name: "space-after-terminator",
        run: space_after_terminator,
    },
    NormalizationPass {
        name: "collapse-multi-spaces",
        run: collapse_multi_spaces,
    },
    NormalizationPass {
        name: "trim-ends",
        run: trim_ends,
    },
];

pub fn normalize(text: &str) -> String {
    PASSES
        .iter()
        .fold(text.to_string(), |current, pass| pass.apply(&current))
}

pub fn collapse_inline_whitespace(text: &str) -> String {
    INLINE_WHITESPACE_RE.replace_all(text, " ").into_owned()
}

// CR and CRLF count as newlines here; a lone `\r` left for the control strip
// would otherwise turn "\r\n\r\n" into a double newline.
pub fn collapse_newlines(text: &str) -> String {
    NEWLINE_RUN_RE.replace_all(text, "\n").into_owned()
}

// `\n` survives: the newline-collapse pass emits single newlines on purpose
// and the output invariant only forbids runs of them. Removing a control that
// sat between two newlines must not leave such a run behind, so the pass
// re-collapses newlines after filtering.
pub fn strip_control_characters(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|&c| {
            c == '\n' || !(('\u{0}'..='\u{1f}').contains(&c) || ('\u{7f}'..='\u{9f}').contains(&c))
        })
        .collect();
    NEWLINE_RUN_RE.replace_all(&stripped, "\n").into_owned()
}

pub fn straighten_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201c}' | '\u{201d}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect()
}

pub fn collapse_repeated_terminators(text: &str) -> String {
    let text = REPEATED_PERIOD_RE.replace_all(text, ".");
    let text = REPEATED_BANG_RE.replace_all(&text, "!");
    REPEATED_QUESTION_RE.replace_all(&text, "?").into_owned()
}

pub fn space_after_terminator(text: &str) -> String {
    TERMINATOR_THEN_WORD_RE
        .replace_all(text, "${1} ${2}")
        .into_owned()
}

pub fn collapse_multi_spaces(text: &str) -> String {
    MULTI_SPACE_RE.replace_all(text, " ").into_owned()
}

pub fn trim_ends(text: &str) -> String {
    text.trim().to_string()
}

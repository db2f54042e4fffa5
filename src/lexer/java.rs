//! Java lexer
//!
//! A rule-driven state machine. Token types, rule order and state transitions
//! follow the Pygments 2.20 `JavaLexer`, which is what the similarity models
//! were fitted against: the same source must produce the same token sequence or
//! the vectorizer vocabulary stops lining up.
//!
//! The lexer is total. Every character of the input ends up in exactly one
//! lexeme; characters no rule accepts become `Error` tokens.

use std::collections::VecDeque;

use regex::{Captures, Regex};

use super::TokenKind;

/// Lexer states. `Root` is the bottom of the stack and is never popped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Root,
    Class,
    Var,
    Import,
    String,
    MultilineString,
}

/// What to emit for one capture group of a grouped rule
#[derive(Debug, Clone, Copy)]
enum Group {
    Kind(TokenKind),
    /// Re-lex the group text from the root state
    Relex,
}

#[derive(Debug, Clone)]
enum Action {
    Token(TokenKind),
    Groups(Vec<Group>),
}

#[derive(Debug, Clone, Copy)]
enum Transition {
    Stay,
    Push(State),
    Pop,
}

#[derive(Debug, Clone)]
struct Rule {
    pattern: Regex,
    /// Only try this rule at the start of a line
    line_start: bool,
    action: Action,
    transition: Transition,
}

impl Rule {
    fn new(pattern: &str, action: Action, transition: Transition) -> Self {
        // `\A` anchors at the current position since matching runs on the
        // remaining slice. The lexer-wide flag is DOTALL.
        let pattern =
            Regex::new(&format!(r"(?s)\A(?:{pattern})")).expect("valid Java lexer pattern");
        Self {
            pattern,
            line_start: false,
            action,
            transition,
        }
    }

    fn token(pattern: &str, kind: TokenKind) -> Self {
        Self::new(pattern, Action::Token(kind), Transition::Stay)
    }

    fn groups(pattern: &str, groups: Vec<Group>) -> Self {
        Self::new(pattern, Action::Groups(groups), Transition::Stay)
    }

    fn then(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }

    fn at_line_start(mut self) -> Self {
        self.line_start = true;
        self
    }
}

const IDENT: &str = r"(?:[^\W\d]|\$)[\w$]*";

const FLOAT: &str = concat!(
    r"([0-9][0-9_]*\.([0-9][0-9_]*)?|\.[0-9][0-9_]*)([eE][+\-]?[0-9][0-9_]*)?[fFdD]?",
    r"|[0-9][eE][+\-]?[0-9][0-9_]*[fFdD]?",
    r"|[0-9]([eE][+\-]?[0-9][0-9_]*)?[fFdD]",
    r"|0[xX]([0-9a-fA-F][0-9a-fA-F_]*\.?|([0-9a-fA-F][0-9a-fA-F_]*)?\.[0-9a-fA-F][0-9a-fA-F_]*)",
    r"[pP][+\-]?[0-9][0-9_]*[fFdD]?",
);

/// Compiled Java lexing rules.
///
/// Construct once and share; lexing borrows the rules immutably.
#[derive(Debug, Clone)]
pub struct JavaLexer {
    root: Vec<Rule>,
    class: Vec<Rule>,
    var: Vec<Rule>,
    import: Vec<Rule>,
    string: Vec<Rule>,
    multiline_string: Vec<Rule>,
}

impl JavaLexer {
    pub fn new() -> Self {
        use Group::{Kind, Relex};
        use TokenKind::*;

        let root = vec![
            Rule::groups(
                r"(\s*)((?:(?:public|private|protected|static|strictfp)(?:\s+))*)(record)\b",
                vec![Kind(Whitespace), Relex, Kind(KeywordDeclaration)],
            )
            .at_line_start()
            .then(Transition::Push(State::Class)),
            Rule::token(r"[^\S\n]+", Whitespace),
            Rule::groups(r"(//.*?)(\n)", vec![Kind(CommentSingle), Kind(Whitespace)]),
            Rule::token(r"/\*.*?\*/", CommentMultiline),
            // before method names so `throw new Foo(` is not a signature
            Rule::token(
                r"(assert|break|case|catch|continue|default|do|else|finally|for|if|goto|instanceof|new|return|switch|this|throw|try|while)\b",
                Keyword,
            ),
            Rule::groups(
                &format!(r"((?:(?:[^\W\d]|\$)[\w.\[\]$<>?]*\s+)+?)({IDENT})(\s*)(\()"),
                vec![Relex, Kind(NameFunction), Kind(Whitespace), Kind(Punctuation)],
            ),
            Rule::token(r"@[^\W\d][\w.]*", NameDecorator),
            Rule::token(
                r"(abstract|const|enum|extends|final|implements|native|non-sealed|permits|private|protected|public|sealed|static|strictfp|super|synchronized|throws|transient|volatile|yield)\b",
                KeywordDeclaration,
            ),
            // module-info directives
            Rule::token(r"(exports|module|open|requires|to|uses|with)\b", Keyword),
            Rule::token(
                r"(boolean|byte|char|double|float|int|long|short|void)\b",
                KeywordType,
            ),
            Rule::groups(r"(package)(\s+)", vec![Kind(KeywordNamespace), Kind(Whitespace)])
                .then(Transition::Push(State::Import)),
            Rule::token(r"(true|false|null)\b", KeywordConstant),
            Rule::token(r"(class|interface)\b", KeywordDeclaration)
                .then(Transition::Push(State::Class)),
            Rule::groups(r"(var)(\s+)", vec![Kind(KeywordDeclaration), Kind(Whitespace)])
                .then(Transition::Push(State::Var)),
            Rule::groups(
                r"(import(?:\s+(?:static|module))?)(\s+)",
                vec![Kind(KeywordNamespace), Kind(Whitespace)],
            )
            .then(Transition::Push(State::Import)),
            Rule::token("\"\"\"\n", StringLiteral).then(Transition::Push(State::MultilineString)),
            Rule::token("\"", StringLiteral).then(Transition::Push(State::String)),
            Rule::token(r"'\\.'|'[^\\]'|'\\u[0-9a-fA-F]{4}'", CharLiteral),
            Rule::groups(
                &format!(r"(\.)({IDENT})"),
                vec![Kind(Punctuation), Kind(NameAttribute)],
            ),
            Rule::groups(
                r"(\s*)(default)(:)",
                vec![Kind(Whitespace), Kind(Keyword), Kind(Punctuation)],
            )
            .at_line_start(),
            Rule::groups(
                &format!(r"(\s*)({IDENT})(:)"),
                vec![Kind(Whitespace), Kind(NameLabel), Kind(Punctuation)],
            )
            .at_line_start(),
            Rule::token(IDENT, Name),
            Rule::token(FLOAT, NumberFloat),
            Rule::token(r"0[xX][0-9a-fA-F][0-9a-fA-F_]*[lL]?", NumberHex),
            Rule::token(r"0[bB][01][01_]*[lL]?", NumberBin),
            Rule::token(r"0[0-7_]+[lL]?", NumberOct),
            Rule::token(r"0|[1-9][0-9_]*[lL]?", NumberInteger),
            Rule::token(r"[~^*!%&\[\]<>|+=/?-]", Operator),
            Rule::token(r"[{}();:.,]", Punctuation),
            Rule::token(r"\n", Whitespace),
        ];

        let class = vec![
            Rule::token(r"\s+", Text),
            Rule::token(IDENT, NameClass).then(Transition::Pop),
        ];
        let var = vec![Rule::token(IDENT, Name).then(Transition::Pop)];
        let import = vec![Rule::token(r"[\w.]+\*?", NameNamespace).then(Transition::Pop)];

        let string = vec![
            Rule::token(r#"[^\\"]+"#, StringLiteral),
            Rule::token(r"\\\\", StringLiteral),
            Rule::token(r#"\\""#, StringLiteral),
            Rule::token(r"\\", StringLiteral),
            Rule::token("\"", StringLiteral).then(Transition::Pop),
        ];

        let mut multiline_string = vec![
            Rule::token("\"\"\"", StringLiteral).then(Transition::Pop),
            Rule::token("\"", StringLiteral),
        ];
        multiline_string.extend(string.iter().cloned());

        Self {
            root,
            class,
            var,
            import,
            string,
            multiline_string,
        }
    }

    /// Lazily lex `text` into `(kind, lexeme)` pairs covering all of it.
    ///
    /// `text` is lexed as given; callers wanting newline normalization should
    /// run it through [`super::normalize_source`] first.
    pub fn tokens<'l, 't>(&'l self, text: &'t str) -> Lexemes<'l, 't> {
        Lexemes {
            lexer: self,
            text,
            pos: 0,
            stack: vec![State::Root],
            pending: VecDeque::new(),
        }
    }

    fn rules(&self, state: State) -> &[Rule] {
        match state {
            State::Root => &self.root,
            State::Class => &self.class,
            State::Var => &self.var,
            State::Import => &self.import,
            State::String => &self.string,
            State::MultilineString => &self.multiline_string,
        }
    }
}

impl Default for JavaLexer {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the lexemes of one text
pub struct Lexemes<'l, 't> {
    lexer: &'l JavaLexer,
    text: &'t str,
    pos: usize,
    stack: Vec<State>,
    pending: VecDeque<(TokenKind, &'t str)>,
}

impl<'l, 't> Lexemes<'l, 't> {
    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.text.as_bytes()[self.pos - 1] == b'\n'
    }

    /// Consume one rule match (or one fallback character) into `pending`.
    fn step(&mut self) {
        let state = self.stack.last().copied().unwrap_or(State::Root);
        let (lexer, text) = (self.lexer, self.text);
        let rest: &'t str = &text[self.pos..];
        let at_line_start = self.at_line_start();

        for rule in lexer.rules(state) {
            if rule.line_start && !at_line_start {
                continue;
            }
            let Some(caps) = rule.pattern.captures(rest) else {
                continue;
            };
            let len = caps.get(0).map_or(0, |m| m.end());
            if len == 0 {
                continue;
            }

            match &rule.action {
                Action::Token(kind) => self.pending.push_back((*kind, &rest[..len])),
                Action::Groups(groups) => self.emit_groups(groups, &caps),
            }
            self.pos += len;

            match rule.transition {
                Transition::Stay => {}
                Transition::Push(next) => self.stack.push(next),
                Transition::Pop => {
                    if self.stack.len() > 1 {
                        self.stack.pop();
                    }
                }
            }
            return;
        }

        // A newline nobody claimed resets the lexer to the root state
        if rest.starts_with('\n') {
            self.stack.truncate(1);
            self.pending.push_back((TokenKind::Whitespace, &rest[..1]));
            self.pos += 1;
            return;
        }

        let width = rest.chars().next().map_or(1, char::len_utf8);
        self.pending.push_back((TokenKind::Error, &rest[..width]));
        self.pos += width;
    }

    fn emit_groups(&mut self, groups: &[Group], caps: &Captures<'t>) {
        for (i, group) in groups.iter().enumerate() {
            let Some(m) = caps.get(i + 1) else {
                continue;
            };
            let lexeme = m.as_str();
            if lexeme.is_empty() {
                continue;
            }
            match group {
                Group::Kind(kind) => self.pending.push_back((*kind, lexeme)),
                Group::Relex => {
                    let nested = self.lexer.tokens(lexeme);
                    self.pending.extend(nested);
                }
            }
        }
    }
}

impl<'l, 't> Iterator for Lexemes<'l, 't> {
    type Item = (TokenKind, &'t str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }
            if self.pos >= self.text.len() {
                return None;
            }
            self.step();
        }
    }
}

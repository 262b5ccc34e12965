use zest::traits::{Grammar, LrTables, TokenCode};
use zest::{
    ActCode, Capture, ErrorCapture, ErrorKind, Lexer, NoCustomError, Parser, Rule, RuleInfo,
    SymCode, ZestResult, INVALID_SYMBOL,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tok {
    Func = 1,
    Ident = 2,
    LParen = 3,
    RParen = 4,
    Colon = 5,
    Comma = 6,
    Arrow = 7,
    Type = 8,
}

impl TokenCode for Tok {
    fn code(&self) -> SymCode {
        *self as SymCode
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Marker,
    Text(String),
    Param(Option<String>),
    Params(Vec<Option<String>>),
    Header {
        name: String,
        params: Vec<Option<String>>,
        returns: String,
    },
}

/// Function headers with a typed parameter list:
///
/// ```text
/// r0  header ::= func ident ( params ) -> type
/// r1  params ::= params , param
/// r2  params ::= param
/// r3  param  ::= ident : type
/// ```
///
/// `param` is an error-capture point: a malformed parameter becomes a
/// placeholder instead of aborting the parse.
#[derive(Debug, Default)]
struct HeaderGrammar {
    captures: usize,
    last_capture: Option<(SymCode, usize)>,
    propagate_only: bool,
}

impl LrTables for HeaderGrammar {
    const NUM_STATES: usize = 13;
    const NUM_TERMINALS: SymCode = 9;
    const MAX_SHIFT: ActCode = 12;
    const MIN_SHIFT_REDUCE: ActCode = 13;
    const MAX_SHIFT_REDUCE: ActCode = 16;
    const MIN_REDUCE: ActCode = 17;
    const MAX_REDUCE: ActCode = 20;
    const ERROR_ACTION: ActCode = 21;
    const ACCEPT_ACTION: ActCode = 22;
    const NO_ACTION: ActCode = 23;

    const ACTION: &'static [ActCode] = &[
        2, 22, 3, 8, 23, 16, 4, 23, 9, 23, 10, 23, 11, 23, 13, 5, 1, 6, 7, 12,
    ];
    const LOOKAHEAD: &'static [SymCode] = &[
        1,
        0,
        2,
        5,
        INVALID_SYMBOL,
        8,
        3,
        INVALID_SYMBOL,
        4,
        INVALID_SYMBOL,
        6,
        INVALID_SYMBOL,
        7,
        INVALID_SYMBOL,
        8,
        2,
        9,
        10,
        11,
        11,
    ];

    const SHIFT_OFFSET: &'static [i32] = &[-1, 1, 0, 3, 13, -2, 4, -20, -3, 5, 13, 6];
    const SHIFT_USE_DEFAULT: i32 = -20;
    const SHIFT_OFFSET_MIN: i32 = -3;
    const SHIFT_OFFSET_MAX: i32 = 13;

    const REDUCE_OFFSET: &'static [i32] =
        &[7, -20, -20, -20, 7, -20, -20, -20, -20, -20, 8];
    const REDUCE_USE_DEFAULT: i32 = -20;
    const REDUCE_OFFSET_MIN: i32 = 7;
    const REDUCE_OFFSET_MAX: i32 = 8;

    const DEFAULT: &'static [ActCode] =
        &[21, 21, 21, 21, 21, 21, 21, 19, 21, 21, 21, 21, 18];

    const FALLBACK: &'static [SymCode] = &[];
    const WILDCARD: Option<SymCode> = None;
    const ERROR_CAPTURES: &'static [SymCode] = &[11];

    const RULE_INFO: &'static [RuleInfo] = &[
        RuleInfo::new(9, 7),
        RuleInfo::new(10, 3),
        RuleInfo::new(10, 1),
        RuleInfo::new(11, 3),
    ];

    const SYMBOL_NAME: &'static [&'static str] = &[
        "$", "func", "ident", "(", ")", ":", ",", "->", "type", "header", "params", "param",
    ];
    const RULE_NAME: &'static [&'static str] = &[
        "header ::= func ident ( params ) -> type",
        "params ::= params , param",
        "params ::= param",
        "param ::= ident : type",
    ];
}

impl Grammar for HeaderGrammar {
    type Token = Value;
    type TokenCode = Tok;
    type Value = Value;
    type Error = NoCustomError;

    fn token_value(&mut self, token: Value) -> Value {
        token
    }

    fn reduce(&mut self, rule: usize, mut rhs: Vec<Value>) -> ZestResult<Value, NoCustomError> {
        let value = match rule {
            0 => {
                let mut rhs = rhs.into_iter();
                let _func = rhs.next();
                let name = match rhs.next() {
                    Some(Value::Text(name)) => name,
                    _ => String::new(),
                };
                let _lparen = rhs.next();
                let params = match rhs.next() {
                    Some(Value::Params(params)) => params,
                    _ => Vec::new(),
                };
                let (_rparen, _arrow) = (rhs.next(), rhs.next());
                let returns = match rhs.next() {
                    Some(Value::Text(returns)) => returns,
                    _ => String::new(),
                };
                Value::Header {
                    name,
                    params,
                    returns,
                }
            }
            1 => {
                let mut rhs = rhs.into_iter();
                let mut params = match rhs.next() {
                    Some(Value::Params(params)) => params,
                    _ => Vec::new(),
                };
                let _comma = rhs.next();
                if let Some(Value::Param(param)) = rhs.next() {
                    params.push(param);
                }
                Value::Params(params)
            }
            2 => {
                let param = match rhs.swap_remove(0) {
                    Value::Param(param) => param,
                    _ => None,
                };
                Value::Params(vec![param])
            }
            3 => {
                let name = match rhs.swap_remove(0) {
                    Value::Text(name) => Some(name),
                    _ => None,
                };
                Value::Param(name)
            }
            _ => return Err(ErrorKind::other(NoCustomError).into()),
        };
        Ok(value)
    }

    fn capture_error(&mut self, capture: ErrorCapture<'_, Self>) -> Capture<Value> {
        // Nothing left to absorb the error into at end of input.
        if self.propagate_only || capture.token.is_none() {
            return Capture::Propagate;
        }
        self.captures += 1;
        self.last_capture = Some((capture.symbol, capture.resolved.len()));
        Capture::CaptureAs(Value::Param(None))
    }
}

fn header_lexer() -> Lexer<(Value, Tok)> {
    Lexer::new(vec![
        Rule::literal("func", (Value::Marker, Tok::Func)),
        Rule::literal("Int", (Value::Text("Int".into()), Tok::Type)),
        Rule::literal("->", (Value::Marker, Tok::Arrow)),
        Rule::literal("(", (Value::Marker, Tok::LParen)),
        Rule::literal(")", (Value::Marker, Tok::RParen)),
        Rule::literal(":", (Value::Marker, Tok::Colon)),
        Rule::literal(",", (Value::Marker, Tok::Comma)),
        Rule::regex(r"[A-Za-z_][A-Za-z0-9_]*", |text| {
            Some((Value::Text(text.to_string()), Tok::Ident))
        })
        .unwrap(),
        Rule::regex(r"\s+", |_| None).unwrap(),
    ])
}

fn parse(input: &str) -> (ZestResult<Value, NoCustomError>, HeaderGrammar) {
    let mut parser = Parser::new(HeaderGrammar::default());
    let mut lexer = header_lexer();

    let tokenized = lexer.tokenize(input, |(token, code), _| parser.consume(token, code));
    let result = tokenized.and_then(|_| parser.end_parsing());
    (result, parser.into_grammar())
}

#[test]
fn test_well_formed_header() {
    let (result, grammar) = parse("func add(a: Int, b: Int) -> Int");

    assert_eq!(
        result.unwrap(),
        Value::Header {
            name: "add".into(),
            params: vec![Some("a".into()), Some("b".into())],
            returns: "Int".into(),
        }
    );
    assert_eq!(grammar.captures, 0);
}

#[test]
fn test_malformed_parameter_is_captured() {
    let (result, grammar) = parse("func add(a: Int, b: Bogus) -> Int");

    assert_eq!(
        result.unwrap(),
        Value::Header {
            name: "add".into(),
            params: vec![Some("a".into()), None],
            returns: "Int".into(),
        }
    );
    assert_eq!(grammar.captures, 1);
    // The capture absorbed the half-parsed `ident :` prefix of the
    // parameter.
    assert_eq!(grammar.last_capture, Some((11, 2)));
}

#[test]
fn test_propagate_leaves_the_stack_intact() {
    let mut parser = Parser::new(HeaderGrammar {
        propagate_only: true,
        ..HeaderGrammar::default()
    });
    let mut lexer = header_lexer();

    let err = lexer
        .tokenize("func add(a: Int, b: Bogus) -> Int", |(token, code), _| {
            parser.consume(token, code)
        })
        .unwrap_err();

    assert!(matches!(err.kind(), ErrorKind::UnexpectedToken { .. }));
    assert_eq!(parser.grammar().captures, 0);
    // The declined capture must not eat the `ident :` frames it offered to
    // the delegate: sentinel, func, ident, (, params, comma, ident, colon.
    assert_eq!(parser.stack_depth(), 8);
}

#[test]
fn test_capture_propagates_at_end_of_input() {
    let (result, grammar) = parse("func add(");

    let err = result.unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UnexpectedEndOfInput));
    assert_eq!(grammar.captures, 0);
}

#[test]
fn test_tracing_leaves_results_unchanged() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();

    let mut parser = Parser::new(HeaderGrammar::default());
    parser.set_tracing(true);

    let mut lexer = header_lexer();
    lexer
        .tokenize("func id(x: Int) -> Int", |(token, code), _| {
            parser.consume(token, code)
        })
        .unwrap();

    let header = parser.end_parsing().unwrap();
    assert_eq!(
        header,
        Value::Header {
            name: "id".into(),
            params: vec![Some("x".into())],
            returns: "Int".into(),
        }
    );
}

//! Helpers to get a handler and parser for descriptor modules.
use std::path::Path;

use swc_common::{
    errors::{emitter::ColorConfig, Handler},
    sync::Lrc,
    FileName, SourceFile, SourceMap,
};
use swc_ecma_ast::Module;
use swc_ecma_parser::{
    lexer::Lexer, EsConfig, Parser, StringInput, Syntax, TsConfig,
};

use crate::error::LoadError;

pub(crate) fn get_handler() -> (Lrc<SourceMap>, Handler) {
    let sm: Lrc<SourceMap> = Lrc::new(Default::default());
    let handler = Handler::with_tty_emitter(
        ColorConfig::Auto,
        true,
        false,
        Some(sm.clone()),
    );
    (sm, handler)
}

/// Choose the parser syntax from the file extension.
///
/// Anything that is not TypeScript is parsed as ecmascript.
pub(crate) fn syntax_for(path: &Path) -> Syntax {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "ts" | "mts" | "cts" => Syntax::Typescript(Default::default()),
        "tsx" => Syntax::Typescript(TsConfig {
            tsx: true,
            ..Default::default()
        }),
        "jsx" => Syntax::Es(EsConfig {
            jsx: true,
            ..Default::default()
        }),
        _ => Syntax::Es(Default::default()),
    }
}

pub(crate) fn get_parser<'a>(
    fm: &'a SourceFile,
    syntax: Syntax,
) -> Parser<Lexer<'a, StringInput<'a>>> {
    let lexer = Lexer::new(
        syntax,
        // JscTarget defaults to es5
        Default::default(),
        StringInput::from(fm),
        None,
    );
    Parser::new_from(lexer)
}

/// Parse module source code that was read from `path`.
///
/// Diagnostics are printed to the terminal and the first
/// fatal error is returned as a `LoadError`.
pub(crate) fn parse_module(
    path: &Path,
    source: String,
) -> Result<Module, LoadError> {
    let (sm, handler) = get_handler();
    let fm = sm.new_source_file(FileName::Real(path.to_path_buf()), source);

    let mut parser = get_parser(&*fm, syntax_for(path));
    let module = parser.parse_module();

    for e in parser.take_errors() {
        e.into_diagnostic(&handler).emit();
    }

    module.map_err(|e| {
        let message = e.kind().msg().to_string();
        e.into_diagnostic(&handler).emit();
        LoadError::Syntax {
            path: path.to_path_buf(),
            message,
        }
    })
}

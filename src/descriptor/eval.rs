//! Static evaluation of a module's default export.
//!
//! Page descriptor modules are never executed. Instead the default
//! export is located in the AST and folded into a JSON value, which
//! allows the common authoring patterns:
//!
//! ```ts
//! import path from 'path';
//!
//! const config: PageConfig = {
//!   title: 'Contact Us',
//!   templatePath: `${__dirname}/contacts.twig`,
//!   filename: 'contacts/index.html',
//!   chunks: ['index'],
//!   entries: {
//!     'contacts/contact-us': path.join(__dirname, 'contacts.ts'),
//!   },
//! };
//!
//! export default config;
//! ```
use std::path::Path;

use anyhow::{anyhow, bail, Result};
use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};

use swc_atoms::JsWord;
use swc_ecma_ast::*;

/// Maximum length of a chain of `const` references.
const MAX_DEPTH: usize = 64;

/// Evaluates constant expressions in the scope of one module.
pub struct Evaluator<'m> {
    dirname: String,
    filename: String,
    /// Top-level `const` bindings.
    bindings: IndexMap<JsWord, &'m Expr>,
    /// Local names bound to the node `path` module.
    path_modules: IndexSet<JsWord>,
    default_export: Option<&'m Expr>,
    default_name: Option<JsWord>,
}

impl<'m> Evaluator<'m> {
    /// Collect the top-level bindings of a module loaded from `file`.
    pub fn new<P: AsRef<Path>>(module: &'m Module, file: P) -> Self {
        let file = file.as_ref();
        let dirname = file
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut evaluator = Evaluator {
            dirname,
            filename: file.to_string_lossy().into_owned(),
            bindings: Default::default(),
            path_modules: Default::default(),
            default_export: None,
            default_name: None,
        };
        for item in module.body.iter() {
            evaluator.collect(item);
        }
        evaluator
    }

    fn collect(&mut self, item: &'m ModuleItem) {
        match item {
            ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) => {
                self.collect_var(var);
            }
            ModuleItem::ModuleDecl(decl) => match decl {
                // export const foo = {};
                ModuleDecl::ExportDecl(export) => {
                    if let Decl::Var(var) = &export.decl {
                        self.collect_var(var);
                    }
                }
                // export default {};
                ModuleDecl::ExportDefaultExpr(export) => {
                    self.default_export = Some(&*export.expr);
                }
                // export { config as default };
                ModuleDecl::ExportNamed(export) if export.src.is_none() => {
                    for spec in export.specifiers.iter() {
                        if let ExportSpecifier::Named(named) = spec {
                            let exported =
                                named.exported.as_ref().unwrap_or(&named.orig);
                            if &*exported.sym == "default" {
                                self.default_name =
                                    Some(named.orig.sym.clone());
                            }
                        }
                    }
                }
                ModuleDecl::Import(import) => {
                    let src = &*import.src.value;
                    if src != "path" && src != "node:path" {
                        return;
                    }
                    for spec in import.specifiers.iter() {
                        match spec {
                            ImportSpecifier::Default(item) => {
                                self.path_modules.insert(item.local.sym.clone());
                            }
                            ImportSpecifier::Namespace(item) => {
                                self.path_modules.insert(item.local.sym.clone());
                            }
                            _ => {}
                        }
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn collect_var(&mut self, var: &'m VarDecl) {
        if var.kind != VarDeclKind::Const {
            return;
        }
        for decl in var.decls.iter() {
            if let (Pat::Ident(binding), Some(init)) = (&decl.name, &decl.init)
            {
                self.bindings.insert(binding.id.sym.clone(), &**init);
            }
        }
    }

    /// Evaluate the default export of the module.
    pub fn default_export(&self) -> Result<Value> {
        if let Some(expr) = self.default_export {
            return self.eval(expr, 0);
        }
        if let Some(name) = &self.default_name {
            return self.lookup(name, 0);
        }
        bail!("module has no default export")
    }

    /// Evaluate a single expression to a JSON value.
    pub fn eval(&self, expr: &Expr, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            bail!("constant reference chain is too deep (cyclic const?)");
        }
        match expr {
            Expr::Lit(lit) => eval_lit(lit),
            Expr::Tpl(tpl) => self.eval_tpl(tpl, depth),
            Expr::Bin(bin) => self.eval_bin(bin, depth),
            Expr::Array(arr) => self.eval_array(arr, depth),
            Expr::Object(obj) => self.eval_object(obj, depth),
            Expr::Ident(ident) => self.lookup(&ident.sym, depth),
            Expr::Call(call) => self.eval_call(call, depth),
            Expr::Paren(n) => self.eval(&n.expr, depth),
            // TypeScript wrappers do not change the value.
            Expr::TsAs(n) => self.eval(&n.expr, depth),
            Expr::TsTypeAssertion(n) => self.eval(&n.expr, depth),
            Expr::TsConstAssertion(n) => self.eval(&n.expr, depth),
            Expr::TsNonNull(n) => self.eval(&n.expr, depth),
            _ => bail!("unsupported expression in page descriptor"),
        }
    }

    fn lookup(&self, name: &JsWord, depth: usize) -> Result<Value> {
        match &**name {
            "__dirname" => Ok(Value::String(self.dirname.clone())),
            "__filename" => Ok(Value::String(self.filename.clone())),
            "undefined" => bail!("`undefined` is only allowed as a property value"),
            _ => {
                let expr = self.bindings.get(name).ok_or_else(|| {
                    anyhow!("`{}` is not a top-level const binding", name)
                })?;
                self.eval(expr, depth + 1)
            }
        }
    }

    fn eval_tpl(&self, tpl: &Tpl, depth: usize) -> Result<Value> {
        let mut out = String::new();
        for (i, quasi) in tpl.quasis.iter().enumerate() {
            let part = quasi.cooked.as_ref().unwrap_or(&quasi.raw);
            out.push_str(&part.value);
            if let Some(expr) = tpl.exprs.get(i) {
                let value = self.eval(expr, depth)?;
                out.push_str(&stringify(&value)?);
            }
        }
        Ok(Value::String(out))
    }

    fn eval_bin(&self, bin: &BinExpr, depth: usize) -> Result<Value> {
        if bin.op != BinaryOp::Add {
            bail!("only `+` is supported in binary expressions");
        }
        let left = self.eval(&bin.left, depth)?;
        let right = self.eval(&bin.right, depth)?;
        match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => {
                let sum = a.as_f64().unwrap_or_default()
                    + b.as_f64().unwrap_or_default();
                number(sum)
            }
            _ => Ok(Value::String(format!(
                "{}{}",
                stringify(&left)?,
                stringify(&right)?
            ))),
        }
    }

    fn eval_array(&self, arr: &ArrayLit, depth: usize) -> Result<Value> {
        let mut out = Vec::new();
        for elem in arr.elems.iter() {
            let elem = elem
                .as_ref()
                .ok_or_else(|| anyhow!("array holes are not supported"))?;
            let value = self.eval(&elem.expr, depth)?;
            if elem.spread.is_some() {
                match value {
                    Value::Array(items) => out.extend(items),
                    _ => bail!("only arrays may be spread into an array"),
                }
            } else {
                out.push(value);
            }
        }
        Ok(Value::Array(out))
    }

    fn eval_object(&self, obj: &ObjectLit, depth: usize) -> Result<Value> {
        let mut out: IndexMap<String, Value> = IndexMap::new();
        for prop in obj.props.iter() {
            match prop {
                PropOrSpread::Spread(spread) => {
                    match self.eval(&spread.expr, depth)? {
                        Value::Object(map) => {
                            for (k, v) in map {
                                out.insert(k, v);
                            }
                        }
                        _ => bail!("only objects may be spread into an object"),
                    }
                }
                PropOrSpread::Prop(prop) => match &**prop {
                    Prop::KeyValue(kv) => {
                        let key = self.prop_name(&kv.key, depth)?;
                        if is_undefined(&kv.value) {
                            out.shift_remove(&key);
                            continue;
                        }
                        let value = self.eval(&kv.value, depth)?;
                        out.insert(key, value);
                    }
                    Prop::Shorthand(ident) => {
                        let value = self.lookup(&ident.sym, depth)?;
                        out.insert(ident.sym.to_string(), value);
                    }
                    _ => bail!("methods and accessors are not supported"),
                },
            }
        }
        Ok(Value::Object(out.into_iter().collect::<Map<_, _>>()))
    }

    fn prop_name(&self, key: &PropName, depth: usize) -> Result<String> {
        Ok(match key {
            PropName::Ident(ident) => ident.sym.to_string(),
            PropName::Str(s) => s.value.to_string(),
            PropName::Num(n) => stringify(&number(n.value)?)?,
            PropName::Computed(computed) => {
                stringify(&self.eval(&computed.expr, depth)?)?
            }
            _ => bail!("unsupported property name"),
        })
    }

    /// Evaluate `path.join(...)` and `path.resolve(...)`.
    fn eval_call(&self, call: &CallExpr, depth: usize) -> Result<Value> {
        let method = match &call.callee {
            ExprOrSuper::Expr(callee) => match &**callee {
                Expr::Member(member) if !member.computed => {
                    match (&member.obj, &*member.prop) {
                        (ExprOrSuper::Expr(obj), Expr::Ident(prop)) => {
                            match &**obj {
                                Expr::Ident(module)
                                    if self
                                        .path_modules
                                        .contains(&module.sym) =>
                                {
                                    Some(&*prop.sym)
                                }
                                _ => None,
                            }
                        }
                        _ => None,
                    }
                }
                _ => None,
            },
            _ => None,
        };

        let method = method.ok_or_else(|| {
            anyhow!("only `path.join()` and `path.resolve()` calls are supported")
        })?;

        let mut segments = Vec::new();
        for arg in call.args.iter() {
            if arg.spread.is_some() {
                bail!("spread arguments are not supported");
            }
            match self.eval(&arg.expr, depth)? {
                Value::String(s) => segments.push(s),
                _ => bail!("path.{}() arguments must be strings", method),
            }
        }

        match method {
            "join" => Ok(Value::String(join_paths(&segments))),
            "resolve" => {
                let cwd = std::env::current_dir()?;
                Ok(Value::String(resolve_paths(
                    &cwd.to_string_lossy(),
                    &segments,
                )))
            }
            _ => bail!("unsupported path method `{}`", method),
        }
    }
}

fn is_undefined(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(ident) => &*ident.sym == "undefined",
        _ => false,
    }
}

fn eval_lit(lit: &Lit) -> Result<Value> {
    Ok(match lit {
        Lit::Str(s) => Value::String(s.value.to_string()),
        Lit::Bool(b) => Value::Bool(b.value),
        Lit::Null(_) => Value::Null,
        Lit::Num(n) => number(n.value)?,
        _ => bail!("unsupported literal in page descriptor"),
    })
}

fn number(value: f64) -> Result<Value> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return Ok(Value::from(value as i64));
    }
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| anyhow!("{} is not a finite number", value))
}

/// String conversion used by template literals and concatenation.
fn stringify(value: &Value) -> Result<String> {
    Ok(match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => bail!("objects and arrays cannot be converted to strings"),
    })
}

/// Join path segments with `/` and normalize the result.
pub(crate) fn join_paths(segments: &[String]) -> String {
    let joined = segments
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| &s[..])
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        return ".".to_string();
    }
    normalize(&joined)
}

/// Resolve segments right to left until an absolute path is formed,
/// falling back to `cwd`.
pub(crate) fn resolve_paths(cwd: &str, segments: &[String]) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in segments.iter().rev() {
        if segment.is_empty() {
            continue;
        }
        parts.push(segment);
        if segment.starts_with('/') {
            break;
        }
    }
    if !parts.last().map(|s| s.starts_with('/')).unwrap_or(false) {
        parts.push(cwd);
    }
    parts.reverse();
    let resolved = normalize(&parts.join("/"));
    if resolved.len() > 1 {
        resolved.trim_end_matches('/').to_string()
    } else {
        resolved
    }
}

fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let trailing = path.ends_with('/');
    let mut out: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if out.last().map(|p| *p != "..").unwrap_or(false) {
                    out.pop();
                } else if !absolute {
                    out.push("..");
                }
            }
            _ => out.push(part),
        }
    }
    let mut normalized = out.join("/");
    if absolute {
        normalized.insert(0, '/');
    }
    if normalized.is_empty() {
        normalized.push('.');
    } else if trailing && normalized != "/" {
        normalized.push('/');
    }
    normalized
}

//! Artifact → typed Rust binding generator.
//!
//! Each contract artifact becomes one module holding:
//! - `ARTIFACT`, the artifact JSON embedded with `include_str!`;
//! - one `EVENT_*` name constant per event;
//! - a newtype over `contract_binding::contracts::Contract` with `deploy`,
//!   `at`, `deployed` and one async method per ABI function. Read-only
//!   functions return typed values, the rest return the mined `Confirmation`.
//!   Every method takes a trailing `TxParams` for per-call overrides.
//!
//! A `mod.rs` listing the generated modules is written next to them.
//!
//! ## `codegen.toml`
//! ```toml
//! out_dir = "src/bindings"          # relative to this file
//! binding_crate = "contract_binding"
//! network = "default"               # which network's ABI to read (optional)
//!
//! [[contract]]
//! artifact = "artifacts/Test.json"
//!
//! [[contract]]
//! artifact = "artifacts/Yo.json"
//! module = "yo"                     # optional, defaults to snake_case(name)
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use alloy_dyn_abi::DynSolType;
use anyhow::{bail, Context, Result};
use contract_binding::abi::{Abi, AbiItem, Param};
use contract_binding::contracts::ContractDescriptor;
use handlebars::Handlebars;
use heck::{ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const CONTRACT_TEMPLATE: &str = include_str!("../templates/contract.rs.hbs");
const MOD_TEMPLATE: &str = include_str!("../templates/mod.rs.hbs");

/// Rust keywords that must be escaped as raw identifiers.
const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static", "struct",
    "trait", "true", "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "gen",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Keywords that cannot be raw identifiers.
const NON_RAW: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Method names taken by the generated wrapper itself.
const RESERVED_METHODS: &[&str] = &["new", "factory", "deploy", "at", "deployed", "contract", "address", "from"];

/// Local names used in generated method bodies.
const RESERVED_ARGS: &[&str] = &["args", "params", "factory"];

// ---- configuration --------------------------------------------------------

/// One artifact to generate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContractEntry {
    pub artifact: PathBuf,
    #[serde(default)]
    pub module: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CodegenConfig {
    pub out_dir: PathBuf,
    /// Directory `include_str!` paths are made relative to (the generated
    /// crate's `CARGO_MANIFEST_DIR`). Defaults to the config file's directory.
    #[serde(default)]
    pub manifest_dir: Option<PathBuf>,
    #[serde(default = "default_binding_crate")]
    pub binding_crate: String,
    /// Network key whose ABI is read. Defaults to `"default"`, else the first.
    #[serde(default)]
    pub network: Option<String>,
    /// Replacement for the built-in contract template.
    #[serde(default)]
    pub template: Option<PathBuf>,
    #[serde(default, rename = "contract")]
    pub contracts: Vec<ContractEntry>,
}

fn default_binding_crate() -> String {
    "contract_binding".to_string()
}

impl CodegenConfig {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            manifest_dir: None,
            binding_crate: default_binding_crate(),
            network: None,
            template: None,
            contracts: Vec::new(),
        }
    }

    /// Load `codegen.toml`; relative paths are resolved against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let mut cfg: CodegenConfig = toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        cfg.out_dir = base.join(&cfg.out_dir);
        cfg.manifest_dir = Some(cfg.manifest_dir.map_or_else(|| base.clone(), |m| base.join(m)));
        cfg.template = cfg.template.map(|t| base.join(t));
        for c in &mut cfg.contracts {
            c.artifact = base.join(&c.artifact);
        }
        Ok(cfg)
    }
}

// ---- template model -------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgModel {
    pub name: String,
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionModel {
    pub abi_name: String,
    pub rust_name: String,
    pub signature: String,
    /// Name handed to the dispatcher: the full signature for overloaded
    /// functions, the bare name otherwise.
    pub call_name: String,
    pub read_only: bool,
    pub inputs: Vec<ArgModel>,
    pub returns: String,
    /// `Contract` method the body forwards to.
    pub dispatch: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventModel {
    pub name: String,
    pub const_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractModel {
    pub source: String,
    pub contract_name: String,
    pub generated_with: Option<String>,
    pub struct_name: String,
    pub module: String,
    pub binding_crate: String,
    pub include: String,
    pub constructor_signature: Option<String>,
    pub constructor_inputs: Vec<ArgModel>,
    pub functions: Vec<FunctionModel>,
    pub events: Vec<EventModel>,
}

/// Pick the ABI of `network`, or `"default"`, or the first network present.
pub fn select_abi<'a>(descriptor: &'a ContractDescriptor, network: Option<&str>) -> Result<&'a Abi> {
    if let Some(id) = network {
        return descriptor
            .network(id)
            .map(|n| &n.abi)
            .with_context(|| format!("{}: no network '{id}' in artifact", descriptor.contract_name));
    }
    descriptor
        .network("default")
        .or_else(|| descriptor.networks.values().next())
        .map(|n| &n.abi)
        .with_context(|| format!("{}: artifact has no networks", descriptor.contract_name))
}

/// Build the template model for one contract.
pub fn build_model(
    descriptor: &ContractDescriptor,
    abi: &Abi,
    module: Option<&str>,
    binding_crate: &str,
    source: &str,
    include: &str,
) -> Result<ContractModel> {
    let mut taken: HashSet<String> = RESERVED_METHODS.iter().map(|s| s.to_string()).collect();
    let mut functions = Vec::new();
    for item in abi.functions() {
        let rust_name = unique(method_ident(item.name()), &mut taken);
        let overloaded = abi.functions().filter(|f| f.name() == item.name()).count() > 1;
        functions.push(function_model(item, rust_name, overloaded)?);
    }

    let (constructor_signature, constructor_inputs) = match abi.constructor() {
        Some(ctor) => (
            Some(format!("constructor({})", param_types(&ctor.inputs))),
            arg_models(&ctor.inputs)?,
        ),
        None => (None, Vec::new()),
    };

    let mut seen = HashSet::new();
    let events = abi
        .events()
        .filter(|e| seen.insert(e.name().to_string()))
        .map(|e| EventModel { name: e.name().to_string(), const_name: format!("EVENT_{}", e.name().to_shouty_snake_case()) })
        .collect();

    Ok(ContractModel {
        source: source.to_string(),
        contract_name: descriptor.contract_name.clone(),
        generated_with: descriptor.generated_with.clone(),
        struct_name: descriptor.contract_name.to_upper_camel_case(),
        module: module.map_or_else(|| module_ident(&descriptor.contract_name), str::to_string),
        binding_crate: binding_crate.to_string(),
        include: include.to_string(),
        constructor_signature,
        constructor_inputs,
        functions,
        events,
    })
}

fn function_model(item: &AbiItem, rust_name: String, overloaded: bool) -> Result<FunctionModel> {
    let read_only = item.is_read_only();
    let (returns, dispatch) = if read_only {
        match output_type(&item.outputs)? {
            Some(ty) => (ty, "call_as"),
            None => ("serde_json::Value".to_string(), "call_with"),
        }
    } else {
        ("Confirmation".to_string(), "send_and_confirm_with")
    };
    Ok(FunctionModel {
        abi_name: item.name().to_string(),
        rust_name,
        signature: item.signature(),
        call_name: if overloaded { item.signature() } else { item.name().to_string() },
        read_only,
        inputs: arg_models(&item.inputs)?,
        returns,
        dispatch: dispatch.to_string(),
    })
}

fn arg_models(params: &[Param]) -> Result<Vec<ArgModel>> {
    let mut taken: HashSet<String> = RESERVED_ARGS.iter().map(|s| s.to_string()).collect();
    params
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let base = if p.name.trim_matches('_').is_empty() { format!("arg{i}") } else { ident(&p.name.to_snake_case()) };
            let name = if taken.contains(&base) { format!("arg{i}") } else { base };
            taken.insert(name.clone());
            Ok(ArgModel { name, ty: rust_type(&param_sol_type(p)?) })
        })
        .collect()
}

fn param_sol_type(p: &Param) -> Result<DynSolType> {
    p.sol_type().map_err(|e| anyhow::anyhow!("parameter '{}': {e}", p.name))
}

fn param_types(params: &[Param]) -> String {
    params.iter().map(Param::canonical_type).collect::<Vec<_>>().join(",")
}

/// Return type for a read-only function; `None` when it does not fit the
/// typed decoders (more than five outputs).
fn output_type(outputs: &[Param]) -> Result<Option<String>> {
    let types = outputs.iter().map(param_sol_type).collect::<Result<Vec<_>>>()?;
    Ok(match types.as_slice() {
        [] => Some("()".to_string()),
        [one] => Some(rust_type(one)),
        many if many.len() <= 5 => {
            Some(format!("({})", many.iter().map(rust_type).collect::<Vec<_>>().join(", ")))
        }
        _ => None,
    })
}

/// Rust type used for a Solidity type in generated signatures.
pub fn rust_type(ty: &DynSolType) -> String {
    match ty {
        DynSolType::Address => "Address".into(),
        DynSolType::Bool => "bool".into(),
        DynSolType::String => "String".into(),
        DynSolType::Bytes => "Bytes".into(),
        DynSolType::FixedBytes(32) => "B256".into(),
        DynSolType::FixedBytes(n) => format!("FixedBytes<{n}>"),
        DynSolType::Uint(_) => "U256".into(),
        DynSolType::Int(_) => "I256".into(),
        DynSolType::Array(inner) | DynSolType::FixedArray(inner, _) => format!("Vec<{}>", rust_type(inner)),
        _ => "serde_json::Value".into(),
    }
}

/// snake_case method name, escaped for Rust.
pub fn method_ident(name: &str) -> String {
    let snake = name.to_snake_case();
    let snake = if snake.is_empty() { "function".to_string() } else { snake };
    ident(&snake)
}

fn module_ident(name: &str) -> String {
    ident(&name.to_snake_case())
}

fn ident(name: &str) -> String {
    let name = if name.starts_with(|c: char| c.is_ascii_digit()) { format!("_{name}") } else { name.to_string() };
    if NON_RAW.contains(&name.as_str()) {
        format!("{name}_")
    } else if KEYWORDS.contains(&name.as_str()) {
        format!("r#{name}")
    } else {
        name
    }
}

/// `name`, or `name_1`, `name_2`, ... if already taken.
fn unique(name: String, taken: &mut HashSet<String>) -> String {
    let bare = name.trim_start_matches("r#").to_string();
    let mut chosen = if RESERVED_METHODS.contains(&bare.as_str()) { format!("{bare}_") } else { name };
    let mut n = 1;
    while taken.contains(&chosen) {
        chosen = format!("{bare}_{n}");
        n += 1;
    }
    taken.insert(chosen.clone());
    chosen
}

/// `include_str!` argument for `artifact`, relative to `manifest_dir` when
/// the artifact lives under it.
pub fn include_expr(artifact: &Path, manifest_dir: Option<&Path>) -> String {
    let rel = manifest_dir.and_then(|m| artifact.strip_prefix(m).ok());
    match rel {
        Some(rel) => {
            let rel = rel.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/");
            format!("concat!(env!(\"CARGO_MANIFEST_DIR\"), \"/{rel}\")")
        }
        None => format!("{:?}", artifact.to_string_lossy()),
    }
}

// ---- rendering --------------------------------------------------------------

pub struct Generator<'a> {
    hb: Handlebars<'a>,
}

impl<'a> Generator<'a> {
    pub fn new() -> Result<Self> {
        Self::with_template(CONTRACT_TEMPLATE)
    }

    pub fn with_template(contract_template: &str) -> Result<Self> {
        let mut hb = Handlebars::new();
        hb.register_escape_fn(handlebars::no_escape);
        hb.register_template_string("contract", contract_template).context("contract template")?;
        hb.register_template_string("mod", MOD_TEMPLATE).context("mod template")?;
        Ok(Self { hb })
    }

    pub fn render_contract(&self, model: &ContractModel) -> Result<String> {
        let out = self.hb.render("contract", model).with_context(|| format!("rendering {}", model.contract_name))?;
        Ok(tidy(&out))
    }

    pub fn render_mod(&self, models: &[ContractModel]) -> Result<String> {
        let out = self.hb.render("mod", &serde_json::json!({ "modules": models }))?;
        Ok(tidy(&out))
    }
}

/// Collapse runs of blank lines left by block helpers.
fn tidy(src: &str) -> String {
    let re = Regex::new(r"\n{3,}").expect("static regex");
    let mut out = re.replace_all(src, "\n\n").into_owned();
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Parse one artifact and build its model.
pub fn load_contract(entry: &ContractEntry, cfg: &CodegenConfig) -> Result<ContractModel> {
    let text = fs::read_to_string(&entry.artifact).with_context(|| format!("reading {}", entry.artifact.display()))?;
    let descriptor = ContractDescriptor::from_json(&text)
        .map_err(|e| anyhow::anyhow!("{}: {e}", entry.artifact.display()))?;
    let abi = select_abi(&descriptor, cfg.network.as_deref())?;
    let source = entry.artifact.file_name().map(|f| f.to_string_lossy().into_owned()).unwrap_or_default();
    let include = include_expr(&entry.artifact, cfg.manifest_dir.as_deref());
    debug!(contract = %descriptor.contract_name, %include, "loaded artifact");
    build_model(&descriptor, abi, entry.module.as_deref(), &cfg.binding_crate, &source, &include)
}

/// Render every configured contract: `(file name, source)` pairs, `mod.rs` last.
pub fn render_all(cfg: &CodegenConfig) -> Result<Vec<(String, String)>> {
    if cfg.contracts.is_empty() {
        bail!("no contracts configured");
    }
    let generator = match &cfg.template {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            Generator::with_template(&text)?
        }
        None => Generator::new()?,
    };
    let models = cfg.contracts.iter().map(|c| load_contract(c, cfg)).collect::<Result<Vec<_>>>()?;

    let mut modules = HashSet::new();
    for m in &models {
        if !modules.insert(m.module.clone()) {
            bail!("two contracts map to module '{}'; set `module` explicitly", m.module);
        }
    }

    let mut files = Vec::with_capacity(models.len() + 1);
    for m in &models {
        files.push((format!("{}.rs", m.module.trim_start_matches("r#")), generator.render_contract(m)?));
    }
    files.push(("mod.rs".to_string(), generator.render_mod(&models)?));
    Ok(files)
}

/// Render and write everything under `cfg.out_dir`.
pub fn generate(cfg: &CodegenConfig) -> Result<Vec<PathBuf>> {
    let files = render_all(cfg)?;
    fs::create_dir_all(&cfg.out_dir).with_context(|| format!("creating {}", cfg.out_dir.display()))?;
    let mut written = Vec::with_capacity(files.len());
    for (name, src) in files {
        let path = cfg.out_dir.join(name);
        fs::write(&path, src).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "generated");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(abi: serde_json::Value) -> ContractDescriptor {
        serde_json::from_value(json!({
            "contract_name": "Yo",
            "generated_with": "3.1.2",
            "networks": {"default": {"abi": abi}}
        }))
        .unwrap()
    }

    fn model(abi: serde_json::Value) -> ContractModel {
        let d = descriptor(abi);
        let abi = select_abi(&d, None).unwrap();
        build_model(&d, abi, None, "contract_binding", "Yo.json", "\"Yo.json\"").unwrap()
    }

    #[test]
    fn maps_solidity_types() {
        let t = |s: &str| rust_type(&DynSolType::parse(s).unwrap());
        assert_eq!(t("address"), "Address");
        assert_eq!(t("uint8"), "U256");
        assert_eq!(t("int256"), "I256");
        assert_eq!(t("bytes32"), "B256");
        assert_eq!(t("bytes4"), "FixedBytes<4>");
        assert_eq!(t("bytes32[]"), "Vec<B256>");
        assert_eq!(t("bool[3]"), "Vec<bool>");
        assert_eq!(t("(uint256,bool)"), "serde_json::Value");
    }

    #[test]
    fn identifiers_are_rust_safe() {
        assert_eq!(method_ident("getRightStatus"), "get_right_status");
        assert_eq!(method_ident("ETHXBT"), "ethxbt");
        assert_eq!(method_ident("__callback"), "callback");
        assert_eq!(method_ident("type"), "r#type");
        assert_eq!(method_ident("self"), "self_");
    }

    #[test]
    fn outputs_and_dispatch() {
        let m = model(json!([
            {"constant": true, "inputs": [], "name": "getInfo", "type": "function",
             "outputs": [{"name": "", "type": "bytes32"}, {"name": "", "type": "bytes32"}, {"name": "", "type": "uint256"}]},
            {"constant": false, "inputs": [{"name": "result", "type": "uint256"}], "name": "trig", "type": "function",
             "outputs": [{"name": "", "type": "uint256"}]},
            {"constant": true, "inputs": [{"name": "", "type": "address"}], "name": "balance", "type": "function",
             "outputs": [{"name": "", "type": "uint256"}]}
        ]));
        assert_eq!(m.functions[0].returns, "(B256, B256, U256)");
        assert_eq!(m.functions[0].dispatch, "call_as");
        assert_eq!(m.functions[1].returns, "Confirmation");
        assert_eq!(m.functions[1].dispatch, "send_and_confirm_with");
        assert_eq!(m.functions[2].inputs, vec![ArgModel { name: "arg0".into(), ty: "Address".into() }]);
    }

    #[test]
    fn overloads_and_reserved_names_get_suffixes() {
        let m = model(json!([
            {"type": "function", "name": "deploy", "inputs": [], "outputs": []},
            {"type": "function", "name": "update", "inputs": [], "outputs": []},
            {"type": "function", "name": "update", "inputs": [{"name": "params", "type": "uint256"}], "outputs": []}
        ]));
        let names: Vec<&str> = m.functions.iter().map(|f| f.rust_name.as_str()).collect();
        assert_eq!(names, vec!["deploy_", "update", "update_1"]);
        assert_eq!(m.functions[2].inputs[0].name, "arg0");
        assert_eq!(m.functions[0].call_name, "deploy");
        assert_eq!(m.functions[1].call_name, "update()");
        assert_eq!(m.functions[2].call_name, "update(uint256)");
    }

    #[test]
    fn same_arity_overloads_dispatch_by_signature() {
        let m = model(json!([
            {"type": "function", "name": "set", "inputs": [{"name": "v", "type": "uint256"}], "outputs": []},
            {"type": "function", "name": "set", "inputs": [{"name": "who", "type": "address"}], "outputs": []}
        ]));
        let src = Generator::new().unwrap().render_contract(&m).unwrap();
        assert!(src.contains("pub async fn set(&self, v: U256, params: TxParams)"));
        assert!(src.contains("pub async fn set_1(&self, who: Address, params: TxParams)"));
        assert!(src.contains("self.inner.send_and_confirm_with(\"set(uint256)\", args, params).await"));
        assert!(src.contains("self.inner.send_and_confirm_with(\"set(address)\", args, params).await"));
    }

    #[test]
    fn renders_module() {
        let m = model(json!([
            {"constant": true, "inputs": [], "name": "owner", "outputs": [{"name": "", "type": "address"}], "type": "function"},
            {"inputs": [], "type": "constructor"},
            {"anonymous": false, "inputs": [], "name": "trigger", "type": "event"}
        ]));
        let src = Generator::new().unwrap().render_contract(&m).unwrap();
        assert!(src.contains("pub struct Yo {"));
        assert!(src.contains("pub const EVENT_TRIGGER: &str = \"trigger\";"));
        assert!(src.contains("pub async fn owner(&self, params: TxParams) -> Result<Address>"));
        assert!(src.contains("self.inner.call_as(\"owner\", args, params).await"));
        assert!(src.contains("include_str!(\"Yo.json\")"));
        assert!(!src.contains("\n\n\n"));
    }

    #[test]
    fn include_paths_are_manifest_relative() {
        let e = include_expr(Path::new("/w/app/artifacts/Test.json"), Some(Path::new("/w/app")));
        assert_eq!(e, "concat!(env!(\"CARGO_MANIFEST_DIR\"), \"/artifacts/Test.json\")");
        assert_eq!(include_expr(Path::new("/x/Test.json"), Some(Path::new("/w/app"))), "\"/x/Test.json\"");
    }
}

//! Generation driver
//!
//! Runs the mappers and the method emitter over every selected module and
//! assembles the results. Modules are independent of each other: each one is
//! generated on its own worker against the shared, read-only
//! [`SchemaIndex`], and results are collected back in index order so a run
//! is deterministic regardless of scheduling.

use crate::assembler::{Assembler, ModuleArtifacts, OutputUnit};
use crate::methods::MethodEmitter;
use crate::native::{NativeMapper, TypeRequest};
use crate::symbols::{SharedSymbols, SymbolTable};
use crate::wire::WireMapper;
use nativebind_core::{
    Diagnostic, GenResult, GenerationReport, GeneratorConfig, Module, ModuleKind, ModuleOutcome, ModuleSelection,
    ModuleStatus, SchemaIndex, SchemaKind, SchemaNode,
};
use rayon::prelude::*;
use std::collections::HashSet;

/// Decides which modules of an index are generated
pub trait ModuleFilter: Sync {
    fn accepts(&self, module: &Module) -> bool;
}

/// Accepts every module
#[derive(Debug, Clone, Copy, Default)]
pub struct AllModules;

impl ModuleFilter for AllModules {
    fn accepts(&self, _module: &Module) -> bool {
        true
    }
}

impl ModuleFilter for ModuleSelection {
    fn accepts(&self, module: &Module) -> bool {
        self.allows(&module.title)
    }
}

/// Artifacts of one successfully generated module
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedModule {
    pub artifacts: ModuleArtifacts,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of a whole run
#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    pub report: GenerationReport,
    /// Artifacts of the generated modules, in index order
    pub modules: Vec<ModuleArtifacts>,
}

/// Generate every module accepted by `filter`.
///
/// A failing module is recorded in the report and contributes no
/// artifacts; the other modules are unaffected.
pub fn generate(index: &SchemaIndex, filter: &dyn ModuleFilter, config: &GeneratorConfig) -> GenerationOutput {
    let modules: Vec<&Module> = index.modules().collect();
    tracing::info!(modules = modules.len(), "generating bindings");

    let results: Vec<(String, Option<GenResult<GeneratedModule>>)> = modules
        .par_iter()
        .map(|module| {
            let outcome = filter
                .accepts(module)
                .then(|| generate_module(index, module, config));
            (module.title.clone(), outcome)
        })
        .collect();

    let mut output = GenerationOutput::default();
    for (module, result) in results {
        let outcome = match result {
            None => {
                tracing::debug!(module = %module, "module filtered out");
                ModuleOutcome {
                    module,
                    status: ModuleStatus::Skipped,
                    diagnostics: Vec::new(),
                }
            }
            Some(Ok(generated)) => {
                output.modules.push(generated.artifacts);
                ModuleOutcome {
                    module,
                    status: ModuleStatus::Generated,
                    diagnostics: generated.diagnostics,
                }
            }
            Some(Err(err)) => {
                tracing::error!(module = %module, code = err.error_code(), "generation failed: {err}");
                ModuleOutcome {
                    module,
                    status: ModuleStatus::Failed(err),
                    diagnostics: Vec::new(),
                }
            }
        };
        output.report.push(outcome);
    }
    output
}

/// Generate a single module
pub fn generate_module(index: &SchemaIndex, module: &Module, config: &GeneratorConfig) -> GenResult<GeneratedModule> {
    let _span = tracing::info_span!("module", name = %module.title).entered();
    let runtime = &config.runtime;

    let symbols = SymbolTable::shared();
    let mut unit = OutputUnit::default();
    map_definitions(index, module, config, &symbols, &mut unit)?;

    let mut methods = MethodEmitter::with_symbols(index, runtime, symbols);
    for (position, method) in module.methods.iter().enumerate() {
        let emitted = methods.emit(module, position, method)?;
        unit.merge(&emitted, &format!("{}#/methods/{position}", module.title))?;
    }
    unit.external_modules.shift_remove(&module.title);

    let artifacts = Assembler::new(runtime, config.header_text.as_deref()).assemble(module, &unit);
    tracing::info!(
        types = unit.declarations.len(),
        methods = module.methods.len(),
        warnings = unit.diagnostics.len(),
        "generated module"
    );
    Ok(GeneratedModule {
        artifacts,
        diagnostics: unit.diagnostics,
    })
}

/// Map every named definition of `module` as a standalone type
fn map_definitions(
    index: &SchemaIndex,
    module: &Module,
    config: &GeneratorConfig,
    symbols: &SharedSymbols,
    unit: &mut OutputUnit,
) -> GenResult<()> {
    let used = (config.prune_unused_definitions && module.kind == ModuleKind::Schema)
        .then(|| referenced_definitions(index, module));

    let mut native = NativeMapper::with_symbols(index, &config.runtime, symbols.clone());
    let mut wire = WireMapper::with_symbols(index, &config.runtime, symbols.clone());

    for (name, definition) in &module.definitions {
        if matches!(definition.kind, SchemaKind::OneOf(_) | SchemaKind::AnyOf(_)) {
            tracing::debug!(definition = %name, "union definition has no standalone type");
            continue;
        }
        if used.as_ref().is_some_and(|used| !used.contains(name.as_str())) {
            tracing::debug!(definition = %name, "pruned unused definition");
            continue;
        }

        let reference = module.definition_ref(name);
        let path = module.schema_path(&reference);
        let node = SchemaNode::new(SchemaKind::Ref(reference));
        let request = TypeRequest::new(name, "", &path);

        let mapped = native
            .map_type(module, &node, &request)
            .and_then(|n| wire.map_type(module, &node, &request).map(|w| (n, w)));
        match mapped {
            Ok((n, w)) => {
                unit.absorb_native(&n, &path)?;
                unit.absorb_wire(&w, &path)?;
            }
            Err(err) if err.is_recoverable() => {
                tracing::warn!(path = %path, "skipping definition: {err}");
                unit.push_diagnostic(Diagnostic::from_error(&err));
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

/// Definitions of `module` reachable from any other loaded document
fn referenced_definitions<'m>(index: &'m SchemaIndex, module: &'m Module) -> HashSet<&'m str> {
    let by_ref: std::collections::HashMap<String, &str> = module
        .definitions
        .keys()
        .map(|name| (module.definition_ref(name), name.as_str()))
        .collect();

    // (document the node lives in, node)
    let mut pending: Vec<(&Module, &SchemaNode)> = Vec::new();
    for other in index.modules().filter(|m| m.uri != module.uri) {
        pending.extend(other.definitions.values().map(|node| (other, node)));
        for method in &other.methods {
            pending.extend(method.params.iter().map(|p| (other, &p.schema)));
            pending.extend(method.result.iter().map(|r| (other, &r.schema)));
        }
    }

    let mut used = HashSet::new();
    while let Some((owner, node)) = pending.pop() {
        let mut refs = Vec::new();
        node.collect_refs(&mut refs);
        for reference in refs {
            let fragment = match reference.split_once('#') {
                Some(("", fragment)) if owner.uri == module.uri => format!("#{fragment}"),
                Some((uri, fragment)) if uri == module.uri => format!("#{fragment}"),
                _ => continue,
            };
            if let Some(&name) = by_ref.get(&fragment)
                && used.insert(name)
                && let Some(definition) = module.definitions.get(name)
            {
                pending.push((module, definition));
            }
        }
    }
    used
}

//! Module assembly
//!
//! Collects the fragments produced for one module into an [`OutputUnit`] and
//! renders it into the three generated files:
//!
//! | Module kind | Native header | Wire header | Implementation |
//! |-------------|---------------|-------------|----------------|
//! | OpenRPC | `include/<Mod>.h` | `src/JsonData_<Mod>.h` | `src/<Mod>.cpp` |
//! | Schema | `include/Common/<Mod>.h` | `src/JsonData_<Mod>.h` | `src/<Mod>_Common.cpp` |
//!
//! Headers list enums first, then type declarations, then method
//! prototypes. The wire header is only produced when the module defines at
//! least one container class.

use crate::fragments::Fragments;
use crate::naming::{capitalize, include_guard};
use crate::native::NativeType;
use crate::wire::WireType;
use indexmap::IndexSet;
use nativebind_core::{Diagnostic, GenResult, Module, ModuleKind, RuntimeNames};
use std::path::PathBuf;

/// Everything generated for one module, before rendering
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputUnit {
    /// Enum typedefs
    pub enums: Fragments,
    /// Handle typedefs and accessor prototypes
    pub declarations: Fragments,
    /// Accessor bodies
    pub definitions: Fragments,
    /// Enum conversion tables
    pub conversions: Fragments,
    /// Wire container classes
    pub containers: Fragments,
    /// Method prototypes and callback typedefs
    pub prototypes: Fragments,
    /// Method bodies
    pub implementations: Fragments,
    pub diagnostics: Vec<Diagnostic>,
    /// Titles of other modules referenced
    pub external_modules: IndexSet<String>,
    /// Some method reports to the metrics module
    pub uses_metrics: bool,
}

impl OutputUnit {
    /// Unit carrying nothing but `diagnostic`
    pub fn with_diagnostic(diagnostic: Diagnostic) -> Self {
        let mut unit = Self::default();
        unit.push_diagnostic(diagnostic);
        unit
    }

    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        if !self.diagnostics.contains(&diagnostic) {
            self.diagnostics.push(diagnostic);
        }
    }

    pub fn absorb_native(&mut self, native: &NativeType, path: &str) -> GenResult<()> {
        self.enums.merge(&native.enums, path)?;
        self.declarations.merge(&native.declarations, path)?;
        self.definitions.merge(&native.definitions, path)?;
        self.conversions.merge(&native.conversions, path)?;
        for diagnostic in &native.diagnostics {
            self.push_diagnostic(diagnostic.clone());
        }
        self.external_modules.extend(native.external_modules.iter().cloned());
        Ok(())
    }

    pub fn absorb_wire(&mut self, wire: &WireType, path: &str) -> GenResult<()> {
        self.containers.merge(&wire.definitions, path)?;
        for diagnostic in &wire.diagnostics {
            self.push_diagnostic(diagnostic.clone());
        }
        self.external_modules.extend(wire.external_modules.iter().cloned());
        Ok(())
    }

    /// Append everything from `other`, keeping first-seen order
    pub fn merge(&mut self, other: &OutputUnit, path: &str) -> GenResult<()> {
        self.enums.merge(&other.enums, path)?;
        self.declarations.merge(&other.declarations, path)?;
        self.definitions.merge(&other.definitions, path)?;
        self.conversions.merge(&other.conversions, path)?;
        self.containers.merge(&other.containers, path)?;
        self.prototypes.merge(&other.prototypes, path)?;
        self.implementations.merge(&other.implementations, path)?;
        for diagnostic in &other.diagnostics {
            self.push_diagnostic(diagnostic.clone());
        }
        self.external_modules.extend(other.external_modules.iter().cloned());
        self.uses_metrics |= other.uses_metrics;
        Ok(())
    }

    /// Whether any generated code names a container class of `module`
    fn uses_containers_of(&self, runtime: &RuntimeNames, module: &str) -> bool {
        let qualifier = format!("{}::{}::JsonData_", runtime.sdk_namespace, capitalize(module));
        [&self.containers, &self.definitions, &self.implementations]
            .iter()
            .any(|fragments| fragments.iter().any(|(_, code)| code.contains(&qualifier)))
    }
}

/// One rendered file, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

/// The rendered files of one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleArtifacts {
    pub module: String,
    pub native_header: GeneratedFile,
    pub wire_header: Option<GeneratedFile>,
    pub implementation: GeneratedFile,
}

impl ModuleArtifacts {
    pub fn files(&self) -> impl Iterator<Item = &GeneratedFile> {
        std::iter::once(&self.native_header)
            .chain(self.wire_header.as_ref())
            .chain(std::iter::once(&self.implementation))
    }
}

/// Include names of a module's files, as other generated files refer to them
struct ModuleFiles {
    native_header: String,
    wire_header: String,
    implementation: String,
}

impl ModuleFiles {
    fn of(module: &Module) -> Self {
        let name = capitalize(&module.title);
        match module.kind {
            ModuleKind::OpenRpc => Self {
                native_header: format!("{name}.h"),
                wire_header: format!("JsonData_{name}.h"),
                implementation: format!("{name}.cpp"),
            },
            ModuleKind::Schema => Self {
                native_header: format!("Common/{name}.h"),
                wire_header: format!("JsonData_{name}.h"),
                implementation: format!("{name}_Common.cpp"),
            },
        }
    }
}

/// Renders [`OutputUnit`]s into files
pub struct Assembler<'a> {
    runtime: &'a RuntimeNames,
    header_text: Option<&'a str>,
}

impl<'a> Assembler<'a> {
    pub fn new(runtime: &'a RuntimeNames, header_text: Option<&'a str>) -> Self {
        Self { runtime, header_text }
    }

    pub fn assemble(&self, module: &Module, unit: &OutputUnit) -> ModuleArtifacts {
        let files = ModuleFiles::of(module);
        let wire_includes: Vec<String> = unit
            .external_modules
            .iter()
            .filter(|ext| unit.uses_containers_of(self.runtime, ext))
            .map(|ext| format!("JsonData_{}.h", capitalize(ext)))
            .collect();

        let wire_header = (!unit.containers.is_empty()).then(|| GeneratedFile {
            path: PathBuf::from("src").join(&files.wire_header),
            contents: self.wire_header(module, unit, &files, &wire_includes),
        });

        ModuleArtifacts {
            module: module.title.clone(),
            native_header: GeneratedFile {
                path: PathBuf::from("include").join(&files.native_header),
                contents: self.native_header(module, unit),
            },
            implementation: GeneratedFile {
                path: PathBuf::from("src").join(&files.implementation),
                contents: self.implementation(unit, &files, wire_header.is_some(), &wire_includes),
            },
            wire_header,
        }
    }

    fn banner(&self) -> String {
        match self.header_text.map(str::trim).filter(|t| !t.is_empty()) {
            Some(text) => {
                let mut banner = String::from("/*\n");
                for line in text.lines() {
                    banner.push_str(format!(" * {line}").trim_end());
                    banner.push('\n');
                }
                banner.push_str(" */\n\n");
                banner
            }
            None => String::new(),
        }
    }

    fn native_header(&self, module: &Module, unit: &OutputUnit) -> String {
        let guard = match module.kind {
            ModuleKind::OpenRpc => include_guard(&module.title, None),
            ModuleKind::Schema => include_guard(&module.title, Some("common")),
        };

        let mut output = self.banner();
        output.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));
        output.push_str(&format!("#include \"{}\"\n", self.runtime.types_header));
        for ext in &unit.external_modules {
            output.push_str(&format!("#include \"Common/{}.h\"\n", capitalize(ext)));
        }
        output.push_str("\n#ifdef __cplusplus\nextern \"C\" {\n#endif\n\n");

        if !unit.enums.is_empty() {
            output.push_str("// Enums\n");
            output.push_str(&unit.enums.render("\n"));
            output.push('\n');
        }
        if !unit.declarations.is_empty() {
            output.push_str("// Types\n");
            output.push_str(&unit.declarations.render("\n"));
            output.push('\n');
        }
        if !unit.prototypes.is_empty() {
            output.push_str("// Methods\n");
            output.push_str(&unit.prototypes.render("\n"));
            output.push('\n');
        }

        output.push_str("#ifdef __cplusplus\n}\n#endif\n\n");
        output.push_str(&format!("#endif // {guard}\n"));
        output
    }

    fn wire_header(&self, module: &Module, unit: &OutputUnit, files: &ModuleFiles, includes: &[String]) -> String {
        let mut output = self.banner();
        output.push_str("#pragma once\n\n");
        output.push_str(&format!("#include \"{}\"\n", files.native_header));
        for include in includes {
            output.push_str(&format!("#include \"{include}\"\n"));
        }
        output.push_str(&format!(
            "\nnamespace {} {{\nnamespace {} {{\n    // Types\n\n",
            self.runtime.sdk_namespace,
            capitalize(&module.title)
        ));
        output.push_str(&unit.containers.render("\n"));
        output.push_str("\n}\n}\n");
        output
    }

    fn implementation(&self, unit: &OutputUnit, files: &ModuleFiles, has_wire: bool, includes: &[String]) -> String {
        let mut output = self.banner();
        output.push_str(&format!("#include \"{}\"\n", self.runtime.runtime_header));
        output.push_str(&format!("#include \"{}\"\n", files.native_header));
        if has_wire {
            output.push_str(&format!("#include \"{}\"\n", files.wire_header));
        }
        for include in includes {
            output.push_str(&format!("#include \"{include}\"\n"));
        }
        if unit.uses_metrics {
            output.push_str(&format!("#include \"{}.h\"\n", capitalize(&self.runtime.metrics_module)));
        }
        output.push('\n');

        if !unit.conversions.is_empty() {
            output.push_str(&format!(
                "namespace {} {{\n\n/* Enum conversions */\n",
                self.runtime.enum_conversion_namespace
            ));
            output.push_str(&unit.conversions.render("\n"));
            output.push_str("\n}\n\n");
        }

        output.push_str("#ifdef __cplusplus\nextern \"C\" {\n#endif\n\n");
        if !unit.definitions.is_empty() {
            output.push_str("// Accessors\n");
            output.push_str(&unit.definitions.render("\n"));
            output.push('\n');
        }
        if !unit.implementations.is_empty() {
            output.push_str("// Methods\n");
            output.push_str(&unit.implementations.render("\n"));
            output.push('\n');
        }
        output.push_str("#ifdef __cplusplus\n}\n#endif\n");
        output
    }
}

//! Method, property and event emission
//!
//! Every OpenRPC method becomes one or more C functions. Their bodies
//! marshal arguments into a JSON parameter object, call into the runtime
//! (transport, property or event API) and copy the wire result back into
//! native out-parameters. Which functions are generated is decided by the
//! method's tags, see [`MethodClass`].

use crate::assembler::OutputUnit;
use crate::enums::comment;
use crate::naming::{capitalize, rpc_method_name};
use crate::native::{NativeMapper, NativeType, TypeRequest, ValueShape};
use crate::symbols::{SharedSymbols, SymbolTable};
use crate::wire::{WireMapper, WireNames};
use indexmap::IndexMap;
use nativebind_core::{
    ArrayItems, Diagnostic, GenError, GenResult, Method, Module, ObjectSchema, Param, PrimitiveKind, RuntimeNames,
    SchemaIndex, SchemaKind, SchemaNode,
};

/// Tag-derived method category, first match wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodClass {
    Property { settable: bool, notifies: bool },
    Event,
    PolymorphicPull,
    PolymorphicReducer,
    TemporalSet,
    Plain,
}

impl MethodClass {
    pub fn of(method: &Method) -> Self {
        if method.has_tag("property") {
            MethodClass::Property {
                settable: true,
                notifies: true,
            }
        } else if method.has_tag("property:readonly") {
            MethodClass::Property {
                settable: false,
                notifies: true,
            }
        } else if method.has_tag("property:immutable") {
            MethodClass::Property {
                settable: false,
                notifies: false,
            }
        } else if method.has_tag("event") {
            MethodClass::Event
        } else if method.has_tag("polymorphic-pull") {
            MethodClass::PolymorphicPull
        } else if method.has_tag("polymorphic-reducer") {
            MethodClass::PolymorphicReducer
        } else if method.has_tag("temporal-set") {
            MethodClass::TemporalSet
        } else {
            MethodClass::Plain
        }
    }
}

/// Parameter of a generated function
#[derive(Debug, Clone)]
struct Arg {
    name: String,
    required: bool,
    ty: NativeType,
}

impl Arg {
    /// Optional by-value arguments travel by pointer so they can be absent
    fn by_pointer(&self) -> bool {
        !self.required && !self.ty.shape.is_handle() && self.ty.shape != ValueShape::String
    }

    fn declaration(&self) -> String {
        if self.by_pointer() {
            format!("{}* {}", self.ty.name, self.name)
        } else {
            format!("{} {}", self.ty.name, self.name)
        }
    }
}

/// Mapped method result
#[derive(Debug, Clone)]
struct ResultValue {
    name: String,
    ty: NativeType,
    /// `success: boolean`, folded into the returned status
    boolean_success: bool,
}

/// Which listener API a notification uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notification {
    PropertyChanged,
    Event,
}

/// Names derived once per method
struct MethodContext<'m> {
    module: &'m Module,
    method: &'m Method,
    position: usize,
    module_name: String,
    method_name: String,
    rpc: String,
}

impl<'m> MethodContext<'m> {
    fn new(module: &'m Module, position: usize, method: &'m Method) -> Self {
        Self {
            module,
            method,
            position,
            module_name: capitalize(&module.title),
            method_name: capitalize(&method.name),
            rpc: rpc_method_name(&module.title, &method.name),
        }
    }

    fn path(&self) -> String {
        format!("{}#/methods/{}", self.module.title, self.position)
    }

    /// `/* name - summary */`
    fn doc(&self) -> String {
        comment(&self.method.name, self.method.summary.as_deref())
    }
}

fn parameter_list(params: Vec<String>) -> String {
    if params.is_empty() {
        "void".to_string()
    } else {
        params.join(", ")
    }
}

fn is_boolean_success(name: &str, schema: &SchemaNode) -> bool {
    name == "success"
        && matches!(
            schema.kind,
            SchemaKind::Primitive {
                kind: PrimitiveKind::Boolean,
                ..
            } | SchemaKind::Const { .. }
        )
}

/// Collapse the params of a reducer into one required array of param objects
fn reduce_params(method: &Method) -> Method {
    let properties: IndexMap<String, SchemaNode> = method
        .params
        .iter()
        .map(|p| (p.name.clone(), p.schema.clone()))
        .collect();
    let required = method.params.iter().filter(|p| p.required).map(|p| p.name.clone()).collect();

    let item = SchemaNode::new(SchemaKind::Object(ObjectSchema {
        properties: Some(properties),
        required: Some(required),
        ..ObjectSchema::default()
    }))
    .with_title(format!("{}Param", method.name));

    let mut reduced = method.clone();
    reduced.params = vec![Param {
        name: format!("{}Params", method.name),
        required: true,
        summary: None,
        schema: SchemaNode::new(SchemaKind::Array(ArrayItems::Single(Box::new(item)))),
    }];
    reduced
}

/// Emits the C functions for OpenRPC methods of one module
pub struct MethodEmitter<'a> {
    runtime: &'a RuntimeNames,
    names: WireNames<'a>,
    native: NativeMapper<'a>,
    wire: WireMapper<'a>,
}

impl<'a> MethodEmitter<'a> {
    pub fn new(index: &'a SchemaIndex, runtime: &'a RuntimeNames) -> Self {
        Self::with_symbols(index, runtime, SymbolTable::shared())
    }

    /// Emitter whose generated names are claimed in `symbols`
    pub fn with_symbols(index: &'a SchemaIndex, runtime: &'a RuntimeNames, symbols: SharedSymbols) -> Self {
        Self {
            runtime,
            names: WireNames::new(runtime),
            native: NativeMapper::with_symbols(index, runtime, symbols.clone()),
            wire: WireMapper::with_symbols(index, runtime, symbols),
        }
    }

    /// Emit method `position` of `module`.
    ///
    /// A method whose signature cannot be determined is skipped: the
    /// returned unit then only carries a diagnostic.
    pub fn emit(&mut self, module: &Module, position: usize, method: &Method) -> GenResult<OutputUnit> {
        let cx = MethodContext::new(module, position, method);
        let mut unit = OutputUnit::default();

        let emitted = match MethodClass::of(method) {
            MethodClass::Property { settable, notifies } => self.emit_property(&cx, settable, notifies, &mut unit),
            MethodClass::Event => self.emit_event(&cx, &mut unit),
            MethodClass::PolymorphicPull => self.emit_pull(&cx, &mut unit),
            MethodClass::PolymorphicReducer => {
                let reduced = reduce_params(method);
                self.emit_plain(&MethodContext::new(module, position, &reduced), &mut unit)
            }
            MethodClass::TemporalSet => {
                tracing::warn!(module = %module.title, method = %method.name, "temporal-set methods are not supported");
                return Ok(OutputUnit::with_diagnostic(Diagnostic::new(
                    cx.path(),
                    format!("temporal-set method '{}' is not supported", method.name),
                )));
            }
            MethodClass::Plain => self.emit_plain(&cx, &mut unit),
        };

        match emitted {
            Ok(()) => {
                tracing::debug!(module = %module.title, method = %method.name, "emitted method");
                Ok(unit)
            }
            Err(err) if err.is_recoverable() => {
                tracing::warn!(module = %module.title, method = %method.name, "skipping method: {err}");
                Ok(OutputUnit::with_diagnostic(Diagnostic::from_error(&err)))
            }
            Err(err) => Err(err),
        }
    }

    // ------------------------------------------------------------------------
    // Mapping
    // ------------------------------------------------------------------------

    fn map_value(
        &mut self,
        module: &Module,
        node: &SchemaNode,
        request: &TypeRequest<'_>,
        unit: &mut OutputUnit,
    ) -> GenResult<NativeType> {
        let native = self.native.map_type(module, node, request)?;
        let wire = self.wire.map_type(module, node, request)?;
        unit.absorb_native(&native, request.path)?;
        unit.absorb_wire(&wire, request.path)?;
        Ok(native)
    }

    /// Params with an undetermined type are left out of the signature
    fn map_params(&mut self, cx: &MethodContext<'_>, unit: &mut OutputUnit) -> GenResult<Vec<Arg>> {
        let mut args = Vec::with_capacity(cx.method.params.len());
        for (j, param) in cx.method.params.iter().enumerate() {
            let path = format!("{}/params/{j}/schema", cx.path());
            let request = TypeRequest::new(&param.name, &cx.method_name, &path);
            match self.map_value(cx.module, &param.schema, &request, unit) {
                Ok(ty) => args.push(Arg {
                    name: param.name.clone(),
                    required: param.required,
                    ty,
                }),
                Err(err) if err.is_recoverable() => {
                    tracing::warn!(module = %cx.module.title, path = %path, "skipping parameter: {err}");
                    unit.push_diagnostic(Diagnostic::from_error(&err));
                }
                Err(err) => return Err(err),
            }
        }
        Ok(args)
    }

    fn map_result(&mut self, cx: &MethodContext<'_>, unit: &mut OutputUnit) -> GenResult<Option<ResultValue>> {
        let Some(result) = &cx.method.result else {
            return Ok(None);
        };
        let path = format!("{}/result/schema", cx.path());
        let request = TypeRequest::new(&result.name, &cx.method_name, &path);
        let ty = self.map_value(cx.module, &result.schema, &request, unit)?;
        Ok(Some(ResultValue {
            name: result.name.clone(),
            ty,
            boolean_success: is_boolean_success(&result.name, &result.schema),
        }))
    }

    /// Result that a property or event cannot do without
    fn required_result(&mut self, cx: &MethodContext<'_>, unit: &mut OutputUnit) -> GenResult<ResultValue> {
        self.map_result(cx, unit)?
            .ok_or_else(|| GenError::UndeterminedPropertyType {
                path: format!("{}/result", cx.path()),
            })
    }

    // ------------------------------------------------------------------------
    // Shared code snippets
    // ------------------------------------------------------------------------

    fn proxy(&self, container: &str) -> String {
        format!("{}::ProxyType<{container}>", self.runtime.core_namespace)
    }

    fn log(&self, level: &str, message: &str) -> String {
        let sdk = &self.runtime.sdk_namespace;
        format!("{level}({sdk}::Logger::Category::OpenRPC, {sdk}::Logger::Module<{sdk}::Accessor>(), {message});")
    }

    fn transport(&self) -> String {
        let sdk = &self.runtime.sdk_namespace;
        let json = &self.runtime.json_namespace;
        format!("    {sdk}::Transport<{json}::IElement>* transport = {sdk}::Accessor::Instance().GetTransport();\n")
    }

    fn transport_error(&self) -> String {
        format!(
            "    }} else {{\n        {}\n    }}\n\n    return status;\n}}\n",
            self.log(&self.runtime.log_error, "\"Error in getting Transport err = %d\", status")
        )
    }

    /// `jsonParameters.Set` for one argument
    fn marshal(&self, arg: &Arg, indent: &str) -> String {
        let name = &arg.name;
        let member = capitalize(name);
        let wire = &arg.ty.wire;
        let inner = if arg.required {
            indent.to_string()
        } else {
            format!("{indent}    ")
        };

        let mut code = String::new();
        if !arg.required {
            code.push_str(&format!("{indent}if ({name} != nullptr) {{\n"));
        }
        match arg.ty.shape {
            ValueShape::String => {
                code.push_str(&format!("{inner}{wire}& {member} = *(static_cast<{wire}*>({name}));\n"));
            }
            shape if shape.is_handle() => {
                let proxy = self.proxy(wire);
                code.push_str(&format!("{inner}{wire}& {member} = *(*(static_cast<{proxy}*>({name})));\n"));
            }
            _ if arg.by_pointer() => code.push_str(&format!("{inner}{wire} {member} = *({name});\n")),
            _ => code.push_str(&format!("{inner}{wire} {member} = {name};\n")),
        }
        code.push_str(&format!("{inner}jsonParameters.Set(_T(\"{name}\"), &{member});\n"));
        if !arg.required {
            code.push_str(&format!("{indent}}}\n"));
        }
        code
    }

    /// Copy `jsonResult` into the caller's out-parameter
    fn unmarshal(&self, result: &ResultValue, indent: &str) -> String {
        let name = &result.name;
        let native = &result.ty.name;
        let wire = &result.ty.wire;

        let mut code = format!("{indent}if ({name} != nullptr) {{\n");
        match result.ty.shape {
            ValueShape::String => code.push_str(&format!(
                "{indent}    {wire}* resultPtr = new {wire}(jsonResult);\n{indent}    *{name} = static_cast<{native}>(resultPtr);\n"
            )),
            shape if shape.is_handle() => {
                let proxy = self.proxy(wire);
                code.push_str(&format!(
                    "{indent}    {proxy}* resultPtr = new {proxy}();\n{indent}    *resultPtr = {proxy}::Create();\n{indent}    *(*resultPtr) = jsonResult;\n{indent}    *{name} = static_cast<{native}>(resultPtr);\n"
                ));
            }
            _ => code.push_str(&format!("{indent}    *{name} = jsonResult.Value();\n")),
        }
        code.push_str(&format!("{indent}}}\n"));
        code
    }

    /// Metrics job submitted after a successful `calls-metrics` call
    fn metrics_job(&self, cx: &MethodContext<'_>, indent: &str, unit: &mut OutputUnit) -> GenResult<String> {
        if !cx.method.has_tag("calls-metrics") {
            return Ok(String::new());
        }
        unit.uses_metrics = true;

        let report = format!("{}_{}", capitalize(&self.runtime.metrics_module), cx.method_name);
        let dispatcher = format!("{report}Dispatcher");
        unit.implementations.insert(
            dispatcher.as_str(),
            format!("static void {dispatcher}(const void*)\n{{\n    {report}();\n}}\n"),
            &cx.path(),
        )?;

        let core = &self.runtime.core_namespace;
        let sdk = &self.runtime.sdk_namespace;
        Ok(format!(
            "{indent}{core}::ProxyType<{core}::IDispatch> job = {core}::ProxyType<{core}::IDispatch>({core}::ProxyType<{sdk}::Worker>::Create({dispatcher}, nullptr));\n{indent}{core}::IWorkerPool::Instance().Submit(job);\n"
        ))
    }

    // ------------------------------------------------------------------------
    // Plain methods
    // ------------------------------------------------------------------------

    fn emit_plain(&mut self, cx: &MethodContext<'_>, unit: &mut OutputUnit) -> GenResult<()> {
        let params = self.map_params(cx, unit)?;
        let result = self.map_result(cx, unit)?;

        let function = format!("{}_{}", cx.module_name, cx.method_name);
        let mut args: Vec<String> = params.iter().map(Arg::declaration).collect();
        if let Some(result) = result.as_ref().filter(|r| !r.boolean_success) {
            args.push(format!("{}* {}", result.ty.name, result.name));
        }
        let signature = format!("uint32_t {function}({})", parameter_list(args));
        let doc = cx.doc();
        unit.prototypes
            .insert(function.as_str(), format!("{doc}\n{signature};\n"), &cx.path())?;

        let result_wire = match &result {
            Some(result) => result.ty.wire.clone(),
            None => self.names.variant_container(),
        };
        let rt = self.runtime;

        let mut body = format!(
            "{doc}\n{signature}\n{{\n    const string method = _T(\"{}\");\n    uint32_t status = {};\n{}    if (transport != nullptr) {{\n        JsonObject jsonParameters;\n",
            cx.rpc,
            rt.status_unavailable,
            self.transport()
        );
        for arg in &params {
            body.push_str(&self.marshal(arg, "        "));
        }
        body.push_str(&format!(
            "\n        {result_wire} jsonResult;\n        status = transport->Invoke(method, jsonParameters, jsonResult);\n        if (status == {}) {{\n            {}\n",
            rt.status_ok,
            self.log(&rt.log_info, &format!("\"{} is successfully invoked\"", cx.rpc))
        ));
        match &result {
            Some(result) if result.boolean_success => body.push_str(&format!(
                "            status = (jsonResult.Value() == true) ? {} : {};\n",
                rt.status_ok, rt.status_not_supported
            )),
            Some(result) => body.push_str(&self.unmarshal(result, "            ")),
            None => {}
        }
        body.push_str(&self.metrics_job(cx, "            ", unit)?);
        body.push_str("        }\n");
        body.push_str(&self.transport_error());

        unit.implementations.insert(function.as_str(), body, &cx.path())
    }

    // ------------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------------

    fn emit_property(
        &mut self,
        cx: &MethodContext<'_>,
        settable: bool,
        notifies: bool,
        unit: &mut OutputUnit,
    ) -> GenResult<()> {
        let params = self.map_params(cx, unit)?;
        let result = self.required_result(cx, unit)?;

        self.emit_getter(cx, &params, &result, unit)?;
        if settable {
            self.emit_setter(cx, &params, &result, unit)?;
        }
        if notifies {
            self.emit_notification(cx, &params, &result, Notification::PropertyChanged, unit)?;
        }
        Ok(())
    }

    fn emit_getter(
        &self,
        cx: &MethodContext<'_>,
        params: &[Arg],
        result: &ResultValue,
        unit: &mut OutputUnit,
    ) -> GenResult<()> {
        let function = format!("{}_Get{}", cx.module_name, cx.method_name);
        let mut args: Vec<String> = params.iter().map(Arg::declaration).collect();
        args.push(format!("{}* {}", result.ty.name, result.name));
        let signature = format!("uint32_t {function}({})", parameter_list(args));
        let doc = cx.doc();
        unit.prototypes
            .insert(function.as_str(), format!("{doc}\n{signature};\n"), &cx.path())?;

        let sdk = &self.runtime.sdk_namespace;
        let mut body = format!(
            "{doc}\n{signature}\n{{\n    const string method = _T(\"{}\");\n    {} jsonResult;\n",
            cx.rpc, result.ty.wire
        );
        if params.is_empty() {
            body.push_str(&format!("\n    uint32_t status = {sdk}::Properties::Get(method, jsonResult);\n"));
        } else {
            body.push_str("    JsonObject jsonParameters;\n");
            for arg in params {
                body.push_str(&self.marshal(arg, "    "));
            }
            body.push_str(&format!(
                "\n    uint32_t status = {sdk}::Properties::Get(method, jsonParameters, jsonResult);\n"
            ));
        }
        body.push_str(&format!("    if (status == {}) {{\n", self.runtime.status_ok));
        body.push_str(&self.unmarshal(result, "        "));
        body.push_str(&self.metrics_job(cx, "        ", unit)?);
        body.push_str("    }\n    return status;\n}\n");

        unit.implementations.insert(function.as_str(), body, &cx.path())
    }

    fn emit_setter(
        &self,
        cx: &MethodContext<'_>,
        params: &[Arg],
        result: &ResultValue,
        unit: &mut OutputUnit,
    ) -> GenResult<()> {
        let value = Arg {
            name: "value".to_string(),
            required: true,
            ty: result.ty.clone(),
        };
        let function = format!("{}_Set{}", cx.module_name, cx.method_name);
        let mut args: Vec<String> = params.iter().map(Arg::declaration).collect();
        args.push(value.declaration());
        let signature = format!("uint32_t {function}({})", parameter_list(args));
        let doc = cx.doc();
        unit.prototypes
            .insert(function.as_str(), format!("{doc}\n{signature};\n"), &cx.path())?;

        let mut body = format!(
            "{doc}\n{signature}\n{{\n    const string method = _T(\"{}\");\n    JsonObject jsonParameters;\n",
            cx.rpc
        );
        for arg in params.iter().chain(std::iter::once(&value)) {
            body.push_str(&self.marshal(arg, "    "));
        }
        body.push_str(&format!(
            "\n    uint32_t status = {}::Properties::Set(method, jsonParameters);\n    if (status == {}) {{\n        {}\n",
            self.runtime.sdk_namespace,
            self.runtime.status_ok,
            self.log(&self.runtime.log_info, &format!("\"{} is successfully set\"", cx.rpc))
        ));
        body.push_str(&self.metrics_job(cx, "        ", unit)?);
        body.push_str("    }\n    return status;\n}\n");

        unit.implementations.insert(function.as_str(), body, &cx.path())
    }

    // ------------------------------------------------------------------------
    // Events and change notifications
    // ------------------------------------------------------------------------

    fn emit_event(&mut self, cx: &MethodContext<'_>, unit: &mut OutputUnit) -> GenResult<()> {
        let params = self.map_params(cx, unit)?;
        let result = self.required_result(cx, unit)?;
        self.emit_notification(cx, &params, &result, Notification::Event, unit)
    }

    /// Callback typedef, inner callback and register/unregister pair
    fn emit_notification(
        &self,
        cx: &MethodContext<'_>,
        params: &[Arg],
        result: &ResultValue,
        kind: Notification,
        unit: &mut OutputUnit,
    ) -> GenResult<()> {
        let path = cx.path();
        let sdk = &self.runtime.sdk_namespace;
        let callback = match kind {
            Notification::PropertyChanged => format!("On{}{}Changed", cx.module_name, cx.method_name),
            Notification::Event => format!("{}{}Callback", cx.module_name, cx.method_name),
        };
        let api = match kind {
            Notification::PropertyChanged => format!("{sdk}::Properties::"),
            Notification::Event => format!("{sdk}::Event::Instance()."),
        };
        let inner = format!("{}{}InnerCallback", cx.module_name, cx.method_name);
        let register = format!("{}_Register_{}Update", cx.module_name, cx.method_name);
        let unregister = format!("{}_Unregister_{}Update", cx.module_name, cx.method_name);

        let mut typedef_args = vec!["const void* userData".to_string()];
        typedef_args.extend(params.iter().map(Arg::declaration));
        typedef_args.push(format!("{} {}", result.ty.name, result.name));
        unit.prototypes.insert(
            callback.as_str(),
            format!("typedef void (*{callback})({});\n", typedef_args.join(", ")),
            &path,
        )?;

        let mut register_args: Vec<String> = params.iter().map(Arg::declaration).collect();
        register_args.push(format!("{callback} userCB"));
        register_args.push("const void* userData".to_string());
        let register_signature = format!("uint32_t {register}({})", register_args.join(", "));
        let unregister_signature = format!("uint32_t {unregister}({callback} userCB)");
        let doc = comment(&cx.method.name, Some("Listen to updates"));
        unit.prototypes.insert(
            register.as_str(),
            format!("{doc}\n{register_signature};\n{unregister_signature};\n"),
            &path,
        )?;

        unit.implementations
            .insert(inner.as_str(), self.inner_callback(&inner, &callback, params, result), &path)?;

        let mut body = format!(
            "{doc}\n{register_signature}\n{{\n    const string eventName = _T(\"{}\");\n    uint32_t status = {};\n    if (userCB != nullptr) {{\n        JsonObject jsonParameters;\n",
            cx.rpc, self.runtime.status_ok
        );
        for arg in params {
            body.push_str(&self.marshal(arg, "        "));
        }
        body.push_str(&format!(
            "\n        status = {api}Subscribe<{}>(eventName, jsonParameters, {inner}, reinterpret_cast<const void*>(userCB), userData);\n    }}\n    return status;\n}}\n",
            result.ty.wire
        ));
        body.push_str(&format!(
            "{unregister_signature}\n{{\n    return {api}Unsubscribe(_T(\"{}\"), reinterpret_cast<const void*>(userCB));\n}}\n",
            cx.rpc
        ));
        unit.implementations.insert(register.as_str(), body, &path)
    }

    /// Static trampoline that decodes a notification and calls the user
    fn inner_callback(&self, inner: &str, callback: &str, params: &[Arg], result: &ResultValue) -> String {
        let wire = &result.ty.wire;
        let proxy = self.proxy(wire);
        let mut code = format!("static void {inner}(const void* userCB, const void* userData, void* response)\n{{\n");

        if params.is_empty() {
            code.push_str(&format!("    {proxy}* jsonResponse = static_cast<{proxy}*>(response);\n"));
        } else {
            let variants = self.proxy(&self.names.variant_container());
            let iterator = format!("{}::Iterator", self.names.variant_container());
            for arg in params {
                code.push_str(&self.context_local(arg));
            }
            code.push_str(&format!(
                "    {proxy}* jsonResponse = nullptr;\n    {variants}& var = *(static_cast<{variants}*>(response));\n\n    ASSERT(var.IsValid() == true);\n    if (var.IsValid() == true) {{\n        {iterator} elements = var->Variants();\n\n        while (elements.Next()) {{\n            if (strcmp(elements.Label(), \"value\") == 0) {{\n                jsonResponse = new {proxy}();\n                *jsonResponse = {proxy}::Create();\n                string valueStr;\n                elements.Current().ToString(valueStr);\n                (*jsonResponse)->FromString(valueStr);\n            }} else if (strcmp(elements.Label(), \"context\") == 0) {{\n                {iterator} params = elements.Current().Object().Variants();\n                while (params.Next()) {{\n"
            ));
            for (i, arg) in params.iter().enumerate() {
                let keyword = if i == 0 { "if" } else { "} else if" };
                code.push_str(&format!(
                    "                    {keyword} (strcmp(params.Label(), \"{}\") == 0) {{\n",
                    arg.name
                ));
                code.push_str(&self.context_decode(arg, "                        "));
            }
            code.push_str("                    }\n                }\n            }\n        }\n    }\n");
        }

        code.push_str("\n    if ((jsonResponse != nullptr) && (jsonResponse->IsValid() == true)) {\n");
        let value = match result.ty.shape {
            ValueShape::String => {
                code.push_str(&format!(
                    "        {wire}* jsonStrResponse = new {wire}();\n        *jsonStrResponse = *(*jsonResponse);\n"
                ));
                format!("static_cast<{}>(jsonStrResponse)", result.ty.name)
            }
            shape if shape.is_handle() => format!("static_cast<{}>(jsonResponse)", result.ty.name),
            _ => "(*jsonResponse)->Value()".to_string(),
        };

        let mut call_args = vec!["userData".to_string()];
        call_args.extend(params.iter().map(|arg| {
            if arg.by_pointer() {
                format!("{}Ptr", arg.name)
            } else {
                arg.name.clone()
            }
        }));
        call_args.push(value);
        code.push_str(&format!(
            "        {callback} callback = reinterpret_cast<{callback}>(userCB);\n        callback({});\n    }}\n}}\n",
            call_args.join(", ")
        ));
        code
    }

    fn context_local(&self, arg: &Arg) -> String {
        let name = &arg.name;
        let native = &arg.ty.name;
        if arg.ty.shape.is_handle() || arg.ty.shape == ValueShape::String {
            format!("    {native} {name} = nullptr;\n")
        } else if arg.by_pointer() {
            format!("    {native} {name}{{}};\n    {native}* {name}Ptr = nullptr;\n")
        } else {
            format!("    {native} {name}{{}};\n")
        }
    }

    fn context_decode(&self, arg: &Arg, indent: &str) -> String {
        let name = &arg.name;
        let native = &arg.ty.name;
        let wire = &arg.ty.wire;
        let mut code = match arg.ty.shape {
            ValueShape::String => format!(
                "{indent}{wire}* {name}Value = new {wire}();\n{indent}*{name}Value = params.Current().Value().c_str();\n{indent}{name} = static_cast<{native}>({name}Value);\n"
            ),
            ValueShape::Boolean => format!("{indent}{name} = params.Current().Boolean();\n"),
            ValueShape::Float => format!("{indent}{name} = static_cast<{native}>(params.Current().Float());\n"),
            ValueShape::Integer => format!("{indent}{name} = static_cast<{native}>(params.Current().Number());\n"),
            ValueShape::Enum => format!(
                "{indent}{wire} {name}Value;\n{indent}{name}Value.FromString(params.Current().String());\n{indent}{name} = {name}Value.Value();\n"
            ),
            ValueShape::Object | ValueShape::Array | ValueShape::Map => {
                let proxy = self.proxy(wire);
                format!(
                    "{indent}string {name}Str;\n{indent}params.Current().ToString({name}Str);\n{indent}{proxy}* {name}Proxy = new {proxy}();\n{indent}*{name}Proxy = {proxy}::Create();\n{indent}(*{name}Proxy)->FromString({name}Str);\n{indent}{name} = static_cast<{native}>({name}Proxy);\n"
                )
            }
        };
        if arg.by_pointer() {
            code.push_str(&format!("{indent}{name}Ptr = &{name};\n"));
        }
        code
    }

    // ------------------------------------------------------------------------
    // Federated pull
    // ------------------------------------------------------------------------

    fn federated(&mut self, cx: &MethodContext<'_>, suffix: &str, unit: &mut OutputUnit) -> GenResult<NativeType> {
        let name = format!("{}{suffix}", cx.method_name);
        let node = SchemaNode::new(SchemaKind::Ref(cx.module.definition_ref(&name)));
        let path = cx.path();
        self.map_value(cx.module, &node, &TypeRequest::new(&name, "", &path), unit)
    }

    fn emit_pull(&mut self, cx: &MethodContext<'_>, unit: &mut OutputUnit) -> GenResult<()> {
        if cx.method.param("result").is_none() {
            tracing::warn!(module = %cx.module.title, method = %cx.method.name, "polymorphic-pull method has no result parameter");
            unit.push_diagnostic(Diagnostic::new(
                cx.path(),
                format!("polymorphic-pull method '{}' has no 'result' parameter", cx.method.name),
            ));
            return Ok(());
        }

        let response = self.federated(cx, "FederatedResponse", unit)?;
        let request = self.federated(cx, "FederatedRequest", unit)?;
        let path = cx.path();
        let rt = self.runtime;

        let push = format!("{}_Push{}", cx.module_name, cx.method_name);
        let push_signature = format!("uint32_t {push}({} result)", response.name);
        let doc = cx.doc();
        unit.prototypes
            .insert(push.as_str(), format!("{doc}\n{push_signature};\n"), &path)?;

        let response_proxy = self.proxy(&response.wire);
        let mut body = format!(
            "{doc}\n{push_signature}\n{{\n    const string method = _T(\"{}\");\n    uint32_t status = {};\n{}    if (transport != nullptr) {{\n        {} jsonParameters = *(*(static_cast<{response_proxy}*>(result)));\n        {}::Boolean jsonResult;\n        status = transport->Invoke(method, jsonParameters, jsonResult);\n        if (status == {}) {{\n            {}\n",
            cx.rpc,
            rt.status_unavailable,
            self.transport(),
            response.wire,
            rt.json_namespace,
            rt.status_ok,
            self.log(
                &rt.log_info,
                &format!("\"{} is successfully pushed with status as %d\", jsonResult.Value()", cx.rpc)
            )
        );
        body.push_str(&self.metrics_job(cx, "            ", unit)?);
        body.push_str("        }\n");
        body.push_str(&self.transport_error());
        unit.implementations.insert(push.as_str(), body, &path)?;

        let callback = format!("OnPull{}{}Callback", cx.module_name, cx.method_name);
        let inner = format!("{}{}InnerCallback", cx.module_name, cx.method_name);
        let register = format!("{}_Register_{}Pull", cx.module_name, cx.method_name);
        let unregister = format!("{}_Unregister_{}Pull", cx.module_name, cx.method_name);
        let register_signature = format!("uint32_t {register}({callback} userCB, const void* userData)");
        let unregister_signature = format!("uint32_t {unregister}({callback} userCB)");

        unit.prototypes.insert(
            callback.as_str(),
            format!("typedef void (*{callback})(const void* userData, {} request);\n", request.name),
            &path,
        )?;
        let pull_doc = comment(&cx.method.name, Some("Listen to pull requests"));
        unit.prototypes.insert(
            register.as_str(),
            format!("{pull_doc}\n{register_signature};\n{unregister_signature};\n"),
            &path,
        )?;

        let request_proxy = self.proxy(&request.wire);
        unit.implementations.insert(
            inner.as_str(),
            format!(
                "static void {inner}(const void* userCB, const void* userData, void* response)\n{{\n    {request_proxy}& jsonResponse = *(static_cast<{request_proxy}*>(response));\n\n    ASSERT(jsonResponse.IsValid() == true);\n    if (jsonResponse.IsValid() == true) {{\n        {callback} callback = reinterpret_cast<{callback}>(userCB);\n        callback(userData, static_cast<{}>(response));\n    }}\n}}\n",
                request.name
            ),
            &path,
        )?;

        let sdk = &rt.sdk_namespace;
        unit.implementations.insert(
            register.as_str(),
            format!(
                "{pull_doc}\n{register_signature}\n{{\n    const string eventName = _T(\"{rpc}\");\n    uint32_t status = {ok};\n    if (userCB != nullptr) {{\n        status = {sdk}::Event::Instance().Subscribe<{wire}>(eventName, {inner}, reinterpret_cast<const void*>(userCB), userData);\n    }}\n    return status;\n}}\n{unregister_signature}\n{{\n    return {sdk}::Event::Instance().Unsubscribe(_T(\"{rpc}\"), reinterpret_cast<const void*>(userCB));\n}}\n",
                rpc = cx.rpc,
                ok = rt.status_ok,
                wire = request.wire,
            ),
            &path,
        )
    }
}

//! Accessor emission
//!
//! Generates the C-ABI surface for handle types: lifecycle functions for
//! every object/array/map handle, get/set/has/clear for object properties,
//! size/get/add/clear for arrays and keys/add/remove/find for maps.
//!
//! A handle is a `ProxyType<Container>*` behind a `void*`. Object, array and
//! map values cross the boundary as handles (copied into a fresh proxy on
//! read), strings as the runtime string handle, everything else by value.

use crate::naming::capitalize;
use crate::native::ValueShape;
use nativebind_core::RuntimeNames;

/// Prototype text for the header and body text for the implementation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emitted {
    pub declaration: String,
    pub definition: String,
}

impl Emitted {
    pub fn append(&mut self, other: Emitted) {
        self.declaration.push_str(&other.declaration);
        self.definition.push_str(&other.definition);
    }
}

/// Native and wire type of one accessed value
#[derive(Debug, Clone, Copy)]
pub struct AccessorType<'a> {
    pub native: &'a str,
    pub wire: &'a str,
    pub shape: ValueShape,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyOptions {
    /// No setter
    pub read_only: bool,
    /// Adds `Has` and `Clear`
    pub optional: bool,
}

pub struct AccessorEmitter<'a> {
    runtime: &'a RuntimeNames,
}

impl<'a> AccessorEmitter<'a> {
    pub fn new(runtime: &'a RuntimeNames) -> Self {
        Self { runtime }
    }

    fn proxy(&self, container: &str) -> String {
        format!("{}::ProxyType<{container}>", self.runtime.core_namespace)
    }

    /// Cast `handle` back to its proxy and validate it
    fn unwrap_handle(&self, container: &str) -> String {
        let proxy = self.proxy(container);
        format!(
            "    ASSERT(handle != NULL);\n    {proxy}* var = static_cast<{proxy}*>(handle);\n    ASSERT(var->IsValid());\n"
        )
    }

    /// `Create`, `Addref`, `Release` and `IsValid` for `handle`
    pub fn handle_lifecycle(&self, handle: &str, container: &str) -> Emitted {
        let proxy = self.proxy(container);

        let declaration = format!(
            "typedef void* {handle};\n\
             {handle} {handle}_Create(void);\n\
             void {handle}_Addref({handle} handle);\n\
             void {handle}_Release({handle} handle);\n\
             bool {handle}_IsValid({handle} handle);\n"
        );

        let definition = format!(
            "{handle} {handle}_Create(void)\n\
             {{\n    {proxy}* type = new {proxy}();\n    *type = {proxy}::Create();\n    return (static_cast<{handle}>(type));\n}}\n\
             void {handle}_Addref({handle} handle)\n\
             {{\n{unwrap}\n    var->AddRef();\n}}\n\
             void {handle}_Release({handle} handle)\n\
             {{\n    ASSERT(handle != NULL);\n    {proxy}* var = static_cast<{proxy}*>(handle);\n    var->Release();\n    if (var->IsValid() != true) {{\n        delete var;\n    }}\n}}\n\
             bool {handle}_IsValid({handle} handle)\n\
             {{\n{unwrap}    return var->IsValid();\n}}\n",
            unwrap = self.unwrap_handle(container),
        );

        Emitted {
            declaration,
            definition,
        }
    }

    /// Accessors for `property` of the object `object` (handle `{object}Handle`)
    pub fn property_accessors(
        &self,
        object: &str,
        container: &str,
        property: &str,
        value: &AccessorType<'_>,
        options: PropertyOptions,
    ) -> Emitted {
        let handle = format!("{object}Handle");
        let member = capitalize(property);
        let native = value.native;
        let wire = value.wire;
        let unwrap = self.unwrap_handle(container);

        let mut declaration = format!("{native} {object}_Get_{member}({handle} handle);\n");
        let mut definition = format!("{native} {object}_Get_{member}({handle} handle)\n{{\n{unwrap}\n");
        match value.shape {
            shape if shape.is_handle() => {
                let proxy = self.proxy(wire);
                definition.push_str(&format!(
                    "    {proxy}* element = new {proxy}();\n    *element = {proxy}::Create();\n    *(*element) = (*var)->{member};\n    return (static_cast<{native}>(element));\n"
                ));
            }
            ValueShape::String => {
                definition.push_str(&format!(
                    "    {wire}* element = new {wire}();\n    *element = (*var)->{member};\n    return (static_cast<{native}>(element));\n"
                ));
            }
            _ => {
                definition.push_str(&format!("    return (static_cast<{native}>((*var)->{member}.Value()));\n"));
            }
        }
        definition.push_str("}\n");

        if !options.read_only {
            declaration.push_str(&format!("void {object}_Set_{member}({handle} handle, {native} value);\n"));
            definition.push_str(&format!("void {object}_Set_{member}({handle} handle, {native} value)\n{{\n{unwrap}\n"));
            match value.shape {
                shape if shape.is_handle() => {
                    let proxy = self.proxy(wire);
                    definition.push_str(&format!(
                        "    {proxy}* object = static_cast<{proxy}*>(value);\n    (*var)->{member} = *(*object);\n"
                    ));
                }
                ValueShape::String => {
                    definition.push_str(&format!(
                        "    {wire}* element = static_cast<{wire}*>(value);\n    (*var)->{member} = *element;\n"
                    ));
                }
                _ => definition.push_str(&format!("    (*var)->{member} = value;\n")),
            }
            definition.push_str("}\n");
        }

        if options.optional {
            declaration.push_str(&format!(
                "bool {object}_Has_{member}({handle} handle);\nvoid {object}_Clear_{member}({handle} handle);\n"
            ));
            definition.push_str(&format!(
                "bool {object}_Has_{member}({handle} handle)\n{{\n{unwrap}\n    return ((*var)->{member}.IsSet());\n}}\n\
                 void {object}_Clear_{member}({handle} handle)\n{{\n{unwrap}\n    ((*var)->{member}.Clear());\n}}\n"
            ));
        }

        Emitted {
            declaration,
            definition,
        }
    }

    /// `{base}_Size/Get/Add/Clear` taking a `handle`.
    ///
    /// With `member`, the array is a property of the object behind `handle`
    /// (whose container is `container`); otherwise `handle` is the array.
    pub fn array_accessors(
        &self,
        base: &str,
        handle: &str,
        container: &str,
        member: Option<&str>,
        element: &AccessorType<'_>,
    ) -> Emitted {
        let target = match member {
            Some(member) => format!("(*var)->{member}"),
            None => "(*(*var))".to_string(),
        };
        let native = element.native;
        let wire = element.wire;
        let unwrap = self.unwrap_handle(container);
        let bounds = &self.runtime.bounds_check;

        let declaration = format!(
            "uint32_t {base}_Size({handle} handle);\n\
             {native} {base}_Get({handle} handle, uint32_t index);\n\
             void {base}_Add({handle} handle, {native} value);\n\
             void {base}_Clear({handle} handle);\n"
        );

        let mut definition = format!("uint32_t {base}_Size({handle} handle)\n{{\n{unwrap}\n    return ({target}.Length());\n}}\n");

        definition.push_str(&format!(
            "{native} {base}_Get({handle} handle, uint32_t index)\n{{\n{unwrap}\n    if (index >= {target}.Length()) {{\n        {bounds}(index, {target}.Length());\n    }}\n\n"
        ));
        match element.shape {
            shape if shape.is_handle() => {
                let proxy = self.proxy(wire);
                definition.push_str(&format!(
                    "    {proxy}* object = new {proxy}();\n    *object = {proxy}::Create();\n    *(*object) = {target}.Get(index);\n    return (static_cast<{native}>(object));\n"
                ));
            }
            ValueShape::String => {
                definition.push_str(&format!(
                    "    {wire}* element = new {wire}();\n    *element = {target}.Get(index);\n    return (static_cast<{native}>(element));\n"
                ));
            }
            _ => {
                definition.push_str(&format!("    return (static_cast<{native}>({target}.Get(index).Value()));\n"));
            }
        }
        definition.push_str("}\n");

        definition.push_str(&format!("void {base}_Add({handle} handle, {native} value)\n{{\n{unwrap}\n"));
        definition.push_str(&self.element_from_value(element));
        definition.push_str(&format!("\n    {target}.Add(element);\n}}\n"));

        definition.push_str(&format!("void {base}_Clear({handle} handle)\n{{\n{unwrap}\n    {target}.Clear();\n}}\n"));

        Emitted {
            declaration,
            definition,
        }
    }

    /// `{base}_KeysCount/AddKey/RemoveKey/FindKey` on `{base}Handle`.
    ///
    /// `FindKey` returns `false` and leaves `*value` untouched when the key
    /// is absent.
    pub fn map_accessors(&self, base: &str, container: &str, value: &AccessorType<'_>) -> Emitted {
        let handle = format!("{base}Handle");
        let native = value.native;
        let wire = value.wire;
        let unwrap = self.unwrap_handle(container);

        let declaration = format!(
            "uint32_t {base}_KeysCount({handle} handle);\n\
             void {base}_AddKey({handle} handle, const char* key, {native} value);\n\
             void {base}_RemoveKey({handle} handle, const char* key);\n\
             bool {base}_FindKey({handle} handle, const char* key, {native}* value);\n"
        );

        let mut definition = format!(
            "uint32_t {base}_KeysCount({handle} handle)\n{{\n{unwrap}    {container}::Iterator elements = (*var)->Variants();\n    uint32_t count = 0;\n    while (elements.Next()) {{\n        count++;\n    }}\n    return (count);\n}}\n"
        );

        definition.push_str(&format!("void {base}_AddKey({handle} handle, const char* key, {native} value)\n{{\n{unwrap}\n"));
        definition.push_str(&self.element_from_value(value));
        definition.push_str("    (*var)->Set(key, &element);\n}\n");

        definition.push_str(&format!(
            "void {base}_RemoveKey({handle} handle, const char* key)\n{{\n{unwrap}\n    (*var)->Remove(key);\n}}\n"
        ));

        definition.push_str(&format!(
            "bool {base}_FindKey({handle} handle, const char* key, {native}* value)\n{{\n{unwrap}\n    bool found = false;\n    if ((value != nullptr) && ((*var)->HasLabel(key) == true)) {{\n"
        ));
        match value.shape {
            ValueShape::Object | ValueShape::Map => {
                let proxy = self.proxy(wire);
                definition.push_str(&format!(
                    "        string objectStr;\n        (*var)->Get(key).Object().ToString(objectStr);\n        {wire} objectMap;\n        objectMap.FromString(objectStr);\n\n        {proxy}* element = new {proxy}();\n        *element = {proxy}::Create();\n        *(*element) = objectMap;\n        *value = static_cast<{native}>(element);\n"
                ));
            }
            ValueShape::Array => {
                let proxy = self.proxy(wire);
                definition.push_str(&format!(
                    "        {proxy}* element = new {proxy}();\n        *element = {proxy}::Create();\n        *(*element) = (*var)->Get(key).Array();\n        *value = static_cast<{native}>(element);\n"
                ));
            }
            ValueShape::String => {
                definition.push_str(&format!(
                    "        {wire}* element = new {wire}();\n        *element = (*var)->Get(key).String();\n        *value = static_cast<{native}>(element);\n"
                ));
            }
            ValueShape::Enum => {
                definition.push_str(&format!(
                    "        {wire} element;\n        element.FromString((*var)->Get(key).String());\n        *value = element.Value();\n"
                ));
            }
            ValueShape::Boolean => {
                definition.push_str("        *value = (*var)->Get(key).Boolean();\n");
            }
            ValueShape::Float => {
                definition.push_str(&format!("        *value = static_cast<{native}>((*var)->Get(key).Float());\n"));
            }
            ValueShape::Integer => {
                definition.push_str(&format!("        *value = static_cast<{native}>((*var)->Get(key).Number());\n"));
            }
        }
        definition.push_str("        found = true;\n    }\n    return found;\n}\n");

        Emitted {
            declaration,
            definition,
        }
    }

    /// Wire `element` built from the native `value` argument
    fn element_from_value(&self, value: &AccessorType<'_>) -> String {
        let wire = value.wire;
        match value.shape {
            shape if shape.is_handle() => {
                let proxy = self.proxy(wire);
                format!("    {wire}& element = *(*(static_cast<{proxy}*>(value)));\n")
            }
            ValueShape::String => format!("    {wire}& element = *(static_cast<{wire}*>(value));\n"),
            _ => format!("    {wire} element(value);\n"),
        }
    }
}

//! Swagger 1.2 API declaration model.
//!
//! The document layout is just schema data for the decoder compiler. The
//! registry for it is compiled once per process on first use.
//!
//! Fields the Swagger 1.2 document marks as required are plain types; the
//! rest are nullable so real-world declarations that omit them still decode.
use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::descriptor::{Descriptor, EnumDef, RecordDef};
use crate::error::SchemaError;
use crate::registry::Registry;
use crate::scope::Scope;
use crate::value::Decoded;

static REGISTRY: OnceCell<Registry> = OnceCell::new();

/// Root type of an API declaration document.
pub fn definition() -> Descriptor {
    Descriptor::deferred("Definition")
}

/// Registry for [`definition`], compiled on first call.
pub fn registry() -> Result<&'static Registry, SchemaError> {
    REGISTRY.get_or_try_init(|| crate::compile(&definition(), &scope()))
}

/// Decode an API declaration document.
pub fn decode_definition(raw: &Value) -> Result<Decoded, crate::Error> {
    Ok(registry()?.decode_root(raw)?)
}

pub fn scope() -> Scope {
    let mut scope = Scope::new();

    let string = Descriptor::string;
    let opt = Descriptor::nullable;

    scope.define("Authorizations", Descriptor::map(string(), string()));

    scope.define_enum(EnumDef::new("ParamType", ["path", "query", "body", "header", "form"]));
    scope.define_enum(EnumDef::new(
        "HttpMethod",
        ["GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"],
    ));

    scope.define_record(
        RecordDef::new("Parameter")
            .field("paramType", named("ParamType"))
            .field("name", string())
            .field("description", opt(string()))
            .field("required", opt(Descriptor::boolean()))
            .field("allowMultiple", opt(Descriptor::boolean())),
    );

    scope.define_record(
        RecordDef::new("ResponseMessage")
            .field("code", Descriptor::int())
            .field("message", string())
            .field("responseModel", opt(string())),
    );

    scope.define_record(
        RecordDef::new("Operation")
            .field("method", named("HttpMethod"))
            .field("summary", opt(string()))
            .field("notes", opt(string()))
            .field("nickname", string())
            .field("type", opt(string()))
            .field("authorizations", opt(named("Authorizations")))
            .field("parameters", opt(Descriptor::list(named("Parameter"))))
            .field("responseMessages", opt(Descriptor::list(named("ResponseMessage"))))
            .field("produces", opt(Descriptor::list(string())))
            .field("consumes", opt(Descriptor::list(string())))
            .field("deprecated", opt(string())),
    );

    scope.define_record(
        RecordDef::new("API")
            .field("path", string())
            .field("name", opt(string()))
            .field("description", opt(string()))
            .field("operations", opt(Descriptor::list(named("Operation")))),
    );

    // A property object is read twice: once for its primitive part, once for
    // the container/constraint part.
    scope.define_record(
        RecordDef::new("PropertySub")
            .field("type", opt(string()))
            .field("$ref", opt(string()))
            .field("format", opt(string())),
    );
    scope.define_record(
        RecordDef::new("PropertyExt")
            .field("defaultValue", opt(Descriptor::map(string(), string())))
            .field("enum", opt(Descriptor::list(string())))
            .field("minimum", opt(string()))
            .field("maximum", opt(string()))
            .field("items", opt(named("JointProperty")))
            .field("uniqueItems", opt(Descriptor::boolean()))
            .field("properties", opt(Descriptor::map(string(), named("JointProperty"))))
            .field("additional_properties", opt(named("JointProperty"))),
    );
    scope.define_record(
        RecordDef::new("Property")
            .field("sub", named("PropertySub"))
            .field("ext", named("PropertyExt")),
    );
    scope.define("JointProperty", Descriptor::joint(named("Property")));
    scope.define("Properties", Descriptor::map(string(), named("JointProperty")));

    scope.define_record(
        RecordDef::new("Model")
            .field("id", string())
            .field("description", opt(string()))
            .field("required", opt(Descriptor::list(string())))
            .field("properties", named("Properties"))
            .field("subTypes", opt(Descriptor::list(string())))
            .field("discriminator", opt(string())),
    );

    scope.define("Models", Descriptor::map(string(), named("Model")));
    scope.define("APIs", Descriptor::list(named("API")));

    scope.define_record(
        RecordDef::new("Definition")
            .field("apiVersion", string())
            .field("swaggerVersion", string())
            .field("basePath", opt(string()))
            .field("resourcePath", opt(string()))
            .field("apis", opt(named("APIs")))
            .field("models", opt(named("Models"))),
    );

    scope
}

fn named(name: &str) -> Descriptor {
    Descriptor::deferred(name)
}

//! Built-in `@api*` tag plugins.
//!
//! Each implementor covers one tag family; [`register_standard`] wires every
//! tag name to its plugin with the family-specific parameters.

mod basic;
mod define;
mod example;
mod field;

pub use basic::{ApiTag, DeprecatedTag, DescriptionTag, FlagTag, Label, Marker, NameList, SampleRequestTag, VersionTag};
pub use define::DefineTag;
pub use example::ExampleTag;
pub use field::FieldTag;

use crate::registry::Registry;

/// Field families: tag name, tree key, default group.
pub const FIELD_FAMILIES: &[(&str, &str, &str)] = &[
    ("apiParam", "parameter", "Parameter"),
    ("apiQuery", "query", "Query"),
    ("apiBody", "body", "Body"),
    ("apiHeader", "header", "Header"),
    ("apiSuccess", "success", "Success 200"),
    ("apiError", "error", "Error 4xx"),
];

pub fn register_standard(registry: &mut Registry) {
    registry.register("api", ApiTag);
    registry.register("apiName", Label::new("name", true));
    registry.register("apiGroup", Label::new("group", true));
    registry.register("apiVersion", VersionTag);
    registry.register("apiDescription", DescriptionTag);
    registry.register("apiDeprecated", DeprecatedTag);
    registry.register("apiPermission", NameList::new("local.permission"));
    registry.register("apiPrivate", FlagTag::new("private"));
    registry.register("apiIgnore", Marker);
    registry.register("apiSampleRequest", SampleRequestTag);

    registry.register("apiDefine", DefineTag::new("global.define", "@apiDefine name [title]"));
    registry.register(
        "apiDefineStructure",
        DefineTag::new("global.defineStructure", "@apiDefineStructure name [title]"),
    );

    registry.register("apiUse", NameList::new("local.use"));
    registry.register("apiStructure", NameList::new("local.structure"));
    registry.register("apiHeaderStructure", NameList::new("local.headerStructure"));
    registry.register("apiSuccessStructure", NameList::new("local.successStructure"));
    registry.register("apiErrorStructure", NameList::new("local.errorStructure"));

    for &(tag, family, default_group) in FIELD_FAMILIES {
        registry.register(tag, FieldTag::new(family, default_group));
    }

    registry.register("apiExample", ExampleTag::new("local.examples"));
    registry.register("apiParamExample", ExampleTag::new("local.parameter.examples"));
    registry.register("apiHeaderExample", ExampleTag::new("local.header.examples"));
    registry.register("apiSuccessExample", ExampleTag::new("local.success.examples"));
    registry.register("apiErrorExample", ExampleTag::new("local.error.examples"));
}

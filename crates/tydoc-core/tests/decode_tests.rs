//! End-to-end decode tests over full extractor documents.
//!
//! Documents are written with the extractor's camelCase keys to exercise
//! key normalization alongside the decode itself.

// Deeply nested `json!` fixtures expand past the default macro recursion
// limit.
#![recursion_limit = "256"]

use serde_json::json;
use tydoc_core::comment::SegmentTarget;
use tydoc_core::error::{DecodeError, ResolveError};
use tydoc_core::reflection::ReflectionData;
use tydoc_core::types::{Type, TypeTarget};
use tydoc_core::{decode_value, Project, ReflectionId, ReflectionKind};

fn widget_library() -> Project {
    decode_value(json!({
        "id": 0,
        "name": "typedoc-project",
        "variant": "project",
        "kind": 1,
        "packageName": "mylib-pkg",
        "children": [
            {
                "id": 1,
                "name": "mylib",
                "variant": "declaration",
                "kind": 2,
                "children": [
                    {
                        "id": 7,
                        "name": "Widget",
                        "variant": "declaration",
                        "kind": 128,
                        "comment": {
                            "summary": [{"kind": "text", "text": "A widget."}]
                        },
                        "flags": {"isAbstract": true},
                        "extendedTypes": [
                            {"type": "reference", "name": "Base", "target": 9}
                        ],
                        "sources": [
                            {"fileName": "src/widget.ts", "line": 10, "character": 4}
                        ],
                        "groups": [{"title": "Methods", "children": [8]}],
                        "children": [
                            {
                                "id": 8,
                                "name": "render",
                                "variant": "declaration",
                                "kind": 2048,
                                "signatures": [
                                    {
                                        "id": 10,
                                        "name": "render",
                                        "variant": "signature",
                                        "kind": 4096,
                                        "type": {"type": "intrinsic", "name": "void"},
                                        "parameters": [
                                            {
                                                "id": 11,
                                                "name": "depth",
                                                "variant": "param",
                                                "kind": 32768,
                                                "type": {"type": "intrinsic", "name": "number"}
                                            }
                                        ]
                                    }
                                ]
                            }
                        ]
                    },
                    {
                        "id": 9,
                        "name": "Base",
                        "variant": "declaration",
                        "kind": 128,
                        "children": []
                    }
                ]
            }
        ],
        "files": {
            "entries": {"1": "src/a.ts"},
            "reflections": {"1": 1}
        }
    }))
    .expect("document decodes")
}

#[test]
fn decodes_project_root_and_symbol_map() {
    let project = widget_library();
    assert_eq!(project.root().name, "typedoc-project");
    assert_eq!(project.root().kind(), ReflectionKind::Project);
    // project, module, two classes, method, signature, parameter
    assert_eq!(project.symbol_count(), 7);
    let ReflectionData::Project {
        ref package_name, ..
    } = project.root().data
    else {
        panic!("root payload is not a project");
    };
    assert_eq!(package_name.as_deref(), Some("mylib-pkg"));
}

#[test]
fn paths_follow_ancestry() {
    let project = widget_library();
    assert_eq!(project.path(ReflectionId(1)).unwrap(), "mylib");
    assert_eq!(project.path(ReflectionId(7)).unwrap(), "mylib/Widget");
    assert_eq!(
        project.path(ReflectionId(8)).unwrap(),
        "mylib/Widget/render"
    );
}

#[test]
fn root_module_of_nested_parameter_is_the_top_level_module() {
    let project = widget_library();
    let root_module = project.root_module(ReflectionId(11)).unwrap();
    assert_eq!(root_module.id, ReflectionId(1));
    assert_eq!(root_module.kind(), ReflectionKind::Module);
}

#[test]
fn parents_are_stamped_through_signatures_and_parameters() {
    let project = widget_library();
    let signature = project.resolve(ReflectionId(10)).unwrap();
    assert_eq!(signature.parent, Some(ReflectionId(8)));
    let parameter = project.resolve(ReflectionId(11)).unwrap();
    assert_eq!(parameter.parent, Some(ReflectionId(10)));
}

#[test]
fn flags_and_sources_are_decoded() {
    let project = widget_library();
    let widget = project.resolve(ReflectionId(7)).unwrap();
    assert!(widget.flag("is_abstract"));
    assert!(!widget.flag("is_static"));
    assert_eq!(widget.sources.len(), 1);
    assert_eq!(widget.sources[0].file_name, "src/widget.ts");
    assert_eq!(widget.sources[0].line, 10);
}

#[test]
fn class_payload_carries_extended_types() {
    let project = widget_library();
    let widget = project.resolve(ReflectionId(7)).unwrap();
    let ReflectionData::Class {
        ref extended_types, ..
    } = widget.data
    else {
        panic!("widget payload is not a class");
    };
    assert_eq!(extended_types.len(), 1);
    assert_eq!(
        extended_types[0].target(),
        Some(&TypeTarget::Symbol(ReflectionId(9)))
    );
}

#[test]
fn groups_resolve_to_live_references() {
    let project = widget_library();
    let groups = project.resolved_groups(ReflectionId(7)).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].title, "Methods");
    assert_eq!(groups[0].children[0].name, "render");
}

#[test]
fn filepath_resolves_through_the_registry() {
    let project = widget_library();
    assert_eq!(project.filepath(ReflectionId(1)).unwrap(), "src/a.ts");
    assert_eq!(
        project.filepath(ReflectionId(999)).unwrap_err(),
        ResolveError::MissingFileAnchor(ReflectionId(999))
    );
}

#[test]
fn repeated_ids_resolve_to_the_same_instance() {
    let project = decode_value(json!({
        "id": 0,
        "name": "pkg",
        "variant": "project",
        "kind": 1,
        "children": [
            {
                "id": 1,
                "name": "mylib",
                "variant": "declaration",
                "kind": 2,
                "children": [
                    {
                        "id": 42,
                        "name": "thing",
                        "variant": "declaration",
                        "kind": 32,
                        "type": {"type": "intrinsic", "name": "string"}
                    },
                    {
                        "id": 50,
                        "name": "thingAlias",
                        "variant": "reference",
                        "kind": 4194304,
                        "target": 42
                    }
                ]
            }
        ]
    }))
    .unwrap();

    let direct = project.resolve(ReflectionId(42)).unwrap();
    let through_reference = project.final_target(ReflectionId(50)).unwrap();
    assert!(std::ptr::eq(direct, through_reference));
}

#[test]
fn cyclic_reference_chain_is_detected() {
    let project = decode_value(json!({
        "id": 0,
        "name": "pkg",
        "variant": "project",
        "kind": 1,
        "children": [
            {"id": 1, "name": "a", "variant": "reference", "kind": 4194304, "target": 2},
            {"id": 2, "name": "b", "variant": "reference", "kind": 4194304, "target": 1}
        ]
    }))
    .unwrap();
    assert!(matches!(
        project.final_target(ReflectionId(1)).unwrap_err(),
        ResolveError::CyclicReferenceChain(_)
    ));
}

#[test]
fn comment_cross_references_render_against_the_symbol_map() {
    let project = decode_value(json!({
        "id": 0,
        "name": "pkg",
        "variant": "project",
        "kind": 1,
        "children": [
            {
                "id": 1,
                "name": "mylib",
                "variant": "declaration",
                "kind": 2,
                "children": [
                    {
                        "id": 7,
                        "name": "Widget",
                        "variant": "declaration",
                        "kind": 128,
                        "children": []
                    },
                    {
                        "id": 20,
                        "name": "docs",
                        "variant": "declaration",
                        "kind": 32,
                        "comment": {
                            "summary": [
                                {"kind": "text", "text": "See "},
                                {"kind": "inline-tag", "tag": "@link", "text": "Widget", "target": 7},
                                {"kind": "text", "text": " and "},
                                {
                                    "kind": "inline-tag",
                                    "tag": "@link",
                                    "text": "the site",
                                    "target": "https://example.com"
                                }
                            ]
                        },
                        "type": {"type": "intrinsic", "name": "string"}
                    }
                ]
            }
        ]
    }))
    .unwrap();

    let docs = project.resolve(ReflectionId(20)).unwrap();
    let comment = docs.comment.as_ref().unwrap();

    let rendered = comment.markdown(Some(&project)).unwrap();
    assert_eq!(
        rendered,
        "See [Widget][mylib/Widget] and [the site](https://example.com)"
    );

    // Without a symbol map, symbol targets degrade to plain text.
    let rendered = comment.markdown(None).unwrap();
    assert_eq!(rendered, "See Widget and [the site](https://example.com)");

    // The segment target survives decode as a symbol id.
    assert_eq!(
        comment.summary[1].target,
        Some(SegmentTarget::Symbol(ReflectionId(7)))
    );
}

#[test]
fn export_assignment_promotes_module_exports() {
    let project = decode_value(json!({
        "id": 0,
        "name": "pkg",
        "variant": "project",
        "kind": 1,
        "children": [
            {
                "id": 1,
                "name": "mylib",
                "variant": "declaration",
                "kind": 2,
                "children": [
                    {
                        "id": 2,
                        "name": "export=",
                        "variant": "declaration",
                        "kind": 64,
                        "signatures": [
                            {
                                "id": 3,
                                "name": "export=",
                                "variant": "signature",
                                "kind": 4096,
                                "type": {
                                    "type": "reflection",
                                    "declaration": {
                                        "id": 4,
                                        "name": "__type",
                                        "variant": "declaration",
                                        "kind": 65536,
                                        "children": [
                                            {
                                                "id": 5,
                                                "name": "alpha",
                                                "variant": "declaration",
                                                "kind": 1024,
                                                "type": {
                                                    "type": "reference",
                                                    "name": "alpha",
                                                    "target": 6
                                                }
                                            }
                                        ]
                                    }
                                }
                            }
                        ]
                    },
                    {
                        "id": 6,
                        "name": "realAlpha",
                        "variant": "declaration",
                        "kind": 64,
                        "signatures": []
                    }
                ]
            }
        ]
    }))
    .unwrap();

    let exports = project.module_exports(ReflectionId(1)).unwrap();
    assert_eq!(exports.len(), 1);
    assert_eq!(exports[0].name, "alpha");
    assert_eq!(exports[0].target, TypeTarget::Symbol(ReflectionId(6)));

    // A module without an `export=` child has no promoted exports.
    let empty = decode_value(json!({
        "id": 0,
        "name": "pkg",
        "variant": "project",
        "kind": 1,
        "children": [
            {"id": 1, "name": "mylib", "variant": "declaration", "kind": 2, "children": []}
        ]
    }))
    .unwrap();
    assert!(empty.module_exports(ReflectionId(1)).unwrap().is_empty());
}

#[test]
fn unresolved_reference_targets_keep_their_descriptor() {
    let project = decode_value(json!({
        "id": 0,
        "name": "pkg",
        "variant": "project",
        "kind": 1,
        "children": [
            {
                "id": 1,
                "name": "dep",
                "variant": "declaration",
                "kind": 32,
                "type": {
                    "type": "reference",
                    "name": "External",
                    "target": {
                        "sourceFileName": "node_modules/dep/index.d.ts",
                        "qualifiedName": "External"
                    }
                }
            }
        ]
    }))
    .unwrap();

    let dep = project.resolve(ReflectionId(1)).unwrap();
    let Some(Type::Reference { ref target, .. }) = dep.ty else {
        panic!("dep has no reference type");
    };
    let Some(TypeTarget::Unresolved(ref descriptor)) = *target else {
        panic!("target was coerced away from a descriptor");
    };
    assert_eq!(descriptor.qualified_name, "External");
    assert_eq!(descriptor.source_file_name, "node_modules/dep/index.d.ts");
}

#[test]
fn empty_project_decodes_to_a_single_symbol() {
    let project = decode_value(json!({
        "id": 12,
        "name": "empty",
        "variant": "project",
        "kind": 1,
        "children": []
    }))
    .unwrap();
    assert_eq!(project.symbol_count(), 1);
    assert!(project.contains(ReflectionId(12)));
    assert_eq!(project.root_id(), ReflectionId(12));
}

#[test]
fn unknown_reflection_kind_rejects_the_whole_document() {
    let err = decode_value(json!({
        "id": 0,
        "name": "pkg",
        "variant": "project",
        "kind": 1,
        "children": [
            {"id": 1, "name": "bad", "variant": "declaration", "kind": 0x99999}
        ]
    }))
    .unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnknownReflectionKind { code: 0x99999 }
    ));
}

#[test]
fn unknown_type_discriminant_rejects_the_whole_document() {
    let err = decode_value(json!({
        "id": 0,
        "name": "pkg",
        "variant": "project",
        "kind": 1,
        "children": [
            {
                "id": 1,
                "name": "bad",
                "variant": "declaration",
                "kind": 32,
                "type": {"type": "rest", "elementType": {"type": "intrinsic", "name": "string"}}
            }
        ]
    }))
    .unwrap_err();
    assert!(matches!(err, DecodeError::UnknownTypeKind { ref discriminant } if discriminant == "rest"));
}

#[test]
fn non_project_root_is_rejected() {
    let err = decode_value(json!({
        "id": 0,
        "name": "mylib",
        "variant": "declaration",
        "kind": 2,
        "children": []
    }))
    .unwrap_err();
    assert!(matches!(err, DecodeError::InvalidRoot { .. }));

    let err = decode_value(json!({"not": "a reflection"})).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidRoot { .. }));
}

#[test]
fn duplicate_ids_are_rejected() {
    let err = decode_value(json!({
        "id": 0,
        "name": "pkg",
        "variant": "project",
        "kind": 1,
        "children": [
            {"id": 1, "name": "a", "variant": "declaration", "kind": 4, "children": []},
            {"id": 1, "name": "b", "variant": "declaration", "kind": 4, "children": []}
        ]
    }))
    .unwrap_err();
    assert!(matches!(
        err,
        DecodeError::DuplicateId {
            id: ReflectionId(1)
        }
    ));
}

#[test]
fn malformed_json_is_a_decode_error() {
    let err = tydoc_core::decode_str("{not json").unwrap_err();
    assert!(matches!(err, DecodeError::Json(_)));
}

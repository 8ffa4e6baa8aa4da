//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tempfile::TempDir;

use regionforge::engine::Context;

pub const TEMPLATE_MODEL_ID: &str = "11111111-1111-1111-1111-111111111111";
pub const TEMPLATE_REPORT_ID: &str = "22222222-2222-2222-2222-222222222222";

/// A working directory holding a template model/report pair and the two
/// config documents at their default locations.
pub struct TemplateRepo {
    dir: TempDir,
}

impl TemplateRepo {
    pub fn new(regions: &[&str]) -> Self {
        let repo = Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        };

        repo.write_json(
            "config/template_report_config",
            &json!({
                "base_path": ".",
                "model_attributes": {
                    "template_model": "Template.SemanticModel",
                    "model_platform": "Template.SemanticModel/.platform",
                    "model_definition": "Template.SemanticModel/definition/expressions.tmdl"
                },
                "report_attributes": {
                    "template_report": "Template.Report",
                    "report_platform": "Template.Report/.platform",
                    "report_definition": "Template.Report/definition.pbir"
                },
                "parameter_name": "Region"
            }),
        );
        repo.set_regions(regions);

        repo.write_json(
            "Template.SemanticModel/.platform",
            &json!({
                "$schema": "https://developer.microsoft.com/json-schemas/fabric/gitIntegration/platformProperties/2.0.0/schema.json",
                "metadata": {"type": "SemanticModel", "displayName": "Template"},
                "config": {"version": "2.0", "logicalId": TEMPLATE_MODEL_ID}
            }),
        );
        repo.write(
            "Template.SemanticModel/definition/expressions.tmdl",
            "expression Region = \"TemplateRegion\" meta [IsParameterQuery=true, Type=\"Text\"]\n",
        );
        repo.write(
            "Template.SemanticModel/definition/model.tmdl",
            "model Model\n\tculture: en-US\n",
        );
        repo.write_json(
            "Template.Report/.platform",
            &json!({
                "metadata": {"type": "Report", "displayName": "Template"},
                "config": {"version": "2.0", "logicalId": TEMPLATE_REPORT_ID}
            }),
        );
        repo.write_json(
            "Template.Report/definition.pbir",
            &json!({
                "version": "4.0",
                "datasetReference": {"byPath": {"path": "../Template.SemanticModel"}}
            }),
        );
        repo.write("Template.Report/report.json", "{\"sections\": []}\n");

        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.path().join(rel)
    }

    pub fn set_regions(&self, regions: &[&str]) {
        self.write_json(
            "config/regions",
            &json!({"naming": {"prefix": "Sales_"}, "regions": regions}),
        );
    }

    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    pub fn write_json(&self, rel: &str, value: &Value) {
        self.write(rel, &serde_json::to_string_pretty(value).unwrap());
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.join(rel)).unwrap_or_else(|e| panic!("read {}: {}", rel, e))
    }

    pub fn read_json(&self, rel: &str) -> Value {
        serde_json::from_str(&self.read(rel)).unwrap()
    }

    /// A quiet context rooted at this directory.
    pub fn context(&self) -> Context {
        Context {
            cwd: Some(self.path().to_path_buf()),
            quiet: true,
            ..Context::default()
        }
    }
}

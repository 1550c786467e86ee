//! YAML → catalogue.
//!
//! Example:
//! ```yaml
//! relations:
//!   - name: Person
//!     tuples: 400
//!     attributes:
//!       - { name: persid, distinct: 400 }
//!       - { name: persname, distinct: 350 }
//!       - { name: age, distinct: 47 }
//! ```

use serde::{Deserialize, Serialize};

use relopt_core::catalog::MemoryCatalogue;

use super::ParseError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogueDoc {
    pub relations: Vec<RelationDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationDef {
    pub name: String,
    pub tuples: u64,
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    pub distinct: u64,
}

impl CatalogueDoc {
    pub fn build(&self) -> Result<MemoryCatalogue, ParseError> {
        let mut catalogue = MemoryCatalogue::new();
        for rel in &self.relations {
            catalogue.create_relation(rel.name.clone(), rel.tuples)?;
            for attr in &rel.attributes {
                catalogue.create_attribute(&rel.name, attr.name.clone(), attr.distinct)?;
            }
        }
        Ok(catalogue)
    }
}

/// Parse a YAML catalogue description.
pub fn parse_yaml_catalogue(yaml_src: &str) -> Result<MemoryCatalogue, ParseError> {
    let doc: CatalogueDoc = serde_yaml::from_str(yaml_src)?;
    doc.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use relopt_core::catalog::Catalogue;
    use relopt_core::error::Error;

    #[test]
    fn builds_catalogue() {
        let cat = parse_yaml_catalogue(
            r#"
relations:
  - name: Person
    tuples: 400
    attributes:
      - { name: persid, distinct: 400 }
      - { name: age, distinct: 47 }
  - name: Empty
    tuples: 0
"#,
        )
        .unwrap();
        assert_eq!(cat.len(), 2);
        let person = cat.relation("Person").unwrap();
        assert_eq!(person.relation.tuple_count, 400);
        assert_eq!(person.relation.names().collect::<Vec<_>>(), vec!["persid", "age"]);
        assert!(cat.relation("Empty").unwrap().relation.attributes.is_empty());
    }

    #[test]
    fn duplicate_attribute_is_schema_error() {
        let err = parse_yaml_catalogue(
            r#"
relations:
  - name: R
    tuples: 1
    attributes: [{ name: a, distinct: 1 }, { name: a, distinct: 1 }]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::Core(Error::Schema(_))));
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let err = parse_yaml_catalogue("relations: [{ name: R }]").unwrap_err();
        assert!(matches!(err, ParseError::Yaml(_)));
    }
}

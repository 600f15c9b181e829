//! Per-entity-type row mappers
//!
//! Each mapper is a pure function from one source record (plus the injected
//! clock) to either a keyed document write or a skip. Rows whose key cell
//! is empty or carries the `"nan"` marker are skipped, never written.

use crate::store::{DocumentWrite, Fields, StoredDocument, Value};

use super::clock::Clock;
use super::record::Record;

/// Stock location every inventory baseline starts in
const DEFAULT_LOCATION: &str = "Bodega Principal";

/// Role assigned to verifiers whose role cell is empty
const DEFAULT_VERIFIER_ROLE: &str = "verificador";

/// The five entity types, in import order. SKU must precede Inventory:
/// the inventory baseline is derived from committed SKU documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Sku,
    Fleet,
    Auxiliaries,
    Verifiers,
    Inventory,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Sku,
        EntityKind::Fleet,
        EntityKind::Auxiliaries,
        EntityKind::Verifiers,
        EntityKind::Inventory,
    ];

    /// Source sheet name; `None` for the store-derived inventory pass
    pub fn sheet(&self) -> Option<&'static str> {
        match self {
            EntityKind::Sku => Some("SKU"),
            EntityKind::Fleet => Some("Flota"),
            EntityKind::Auxiliaries => Some("Auxiliares"),
            EntityKind::Verifiers => Some("Verificadores"),
            EntityKind::Inventory => None,
        }
    }

    /// Target collection
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Sku => "sku",
            EntityKind::Fleet => "vh_programados",
            EntityKind::Auxiliaries => "auxiliares",
            EntityKind::Verifiers => "verificadores",
            EntityKind::Inventory => "inventario",
        }
    }

    /// Operator-facing label
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Sku => "SKU",
            EntityKind::Fleet => "VH programados",
            EntityKind::Auxiliaries => "Auxiliares",
            EntityKind::Verifiers => "Verificadores",
            EntityKind::Inventory => "Inventario",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Result of mapping one source record
#[derive(Debug, Clone, PartialEq)]
pub enum MapOutcome {
    /// Write this document
    Mapped(DocumentWrite),
    /// Row fails the key-presence rule; count it, don't write it
    Skip,
}

/// Map a sheet row for the given entity type
pub fn map_row(kind: EntityKind, record: &Record, clock: &dyn Clock) -> MapOutcome {
    match kind {
        EntityKind::Sku => map_sku(record),
        EntityKind::Fleet => map_fleet(record, clock),
        EntityKind::Auxiliaries => map_auxiliary(record),
        EntityKind::Verifiers => map_verifier(record, clock),
        // Inventory documents are derived from committed SKU documents,
        // never from sheet rows
        EntityKind::Inventory => MapOutcome::Skip,
    }
}

/// `SKU` sheet row → `sku` document, keyed by the SKU code
pub fn map_sku(record: &Record) -> MapOutcome {
    let Some(sku) = record.key_text("SKU") else {
        return MapOutcome::Skip;
    };

    let mut fields = Fields::new();
    fields.insert("sku".to_string(), Value::String(sku.clone()));
    fields.insert(
        "descripcion".to_string(),
        Value::String(record.text("DESCRIPCIÓN").unwrap_or_default()),
    );
    fields.insert("activo".to_string(), Value::Bool(true));

    MapOutcome::Mapped(DocumentWrite::assigned(sku, fields))
}

/// `Flota` sheet row → `vh_programados` document under a generated id
///
/// No natural unique key exists in the source for scheduled vehicles, so
/// the store allocates one. Re-importing the sheet therefore creates new
/// documents each run.
pub fn map_fleet(record: &Record, clock: &dyn Clock) -> MapOutcome {
    let Some(vh_id) = record.key_text("IDVH") else {
        return MapOutcome::Skip;
    };

    let mut fields = Fields::new();
    fields.insert("vh_id".to_string(), Value::String(vh_id));
    fields.insert(
        "placa".to_string(),
        Value::String(record.text("Placa").unwrap_or_default()),
    );
    // The sheet carries no date column; stamp the capture time
    fields.insert("fecha".to_string(), Value::Timestamp(clock.now()));
    // Product list is filled in later by the application
    fields.insert("productos".to_string(), Value::Array(Vec::new()));

    MapOutcome::Mapped(DocumentWrite::generated(fields))
}

/// `Auxiliares` sheet row → `auxiliares` document, keyed by national id
pub fn map_auxiliary(record: &Record) -> MapOutcome {
    let Some(cedula) = record.key_text("Cedula") else {
        return MapOutcome::Skip;
    };

    let mut fields = Fields::new();
    fields.insert(
        "nombre".to_string(),
        Value::String(record.text("Nombre").unwrap_or_default()),
    );
    fields.insert("cedula".to_string(), Value::String(cedula.clone()));
    fields.insert(
        "cargo".to_string(),
        Value::String(record.text("Rol").unwrap_or_default()),
    );
    // Contact fields are not in the source; reserved for later enrichment
    fields.insert("correo".to_string(), Value::String(String::new()));
    fields.insert("telefono".to_string(), Value::String(String::new()));
    fields.insert("activo".to_string(), Value::Bool(true));

    MapOutcome::Mapped(DocumentWrite::assigned(cedula, fields))
}

/// `Verificadores` sheet row → `verificadores` document, keyed by national id
pub fn map_verifier(record: &Record, clock: &dyn Clock) -> MapOutcome {
    let Some(uid) = record.key_text("Cedula") else {
        return MapOutcome::Skip;
    };

    let mut fields = Fields::new();
    fields.insert("uid".to_string(), Value::String(uid.clone()));
    fields.insert(
        "nombre".to_string(),
        Value::String(record.text("Nombre").unwrap_or_default()),
    );
    fields.insert("correo".to_string(), Value::String(String::new()));
    fields.insert(
        "rol".to_string(),
        Value::String(
            record
                .text("Rol")
                .unwrap_or_else(|| DEFAULT_VERIFIER_ROLE.to_string()),
        ),
    );
    fields.insert("fecha_creacion".to_string(), Value::Timestamp(clock.now()));

    MapOutcome::Mapped(DocumentWrite::assigned(uid, fields))
}

/// Committed SKU document → `inventario` baseline document
///
/// Derived entity: iterates already-imported SKU documents instead of a
/// sheet. Stock starts at zero in the default location.
pub fn inventory_baseline(sku_doc: &StoredDocument, clock: &dyn Clock) -> MapOutcome {
    let sku = match sku_doc.fields.get("sku").and_then(Value::as_str) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => return MapOutcome::Skip,
    };

    let mut fields = Fields::new();
    fields.insert("sku".to_string(), Value::String(sku.clone()));
    fields.insert("stock".to_string(), Value::Int(0));
    fields.insert(
        "ubicacion".to_string(),
        Value::String(DEFAULT_LOCATION.to_string()),
    );
    fields.insert(
        "fecha_actualizacion".to_string(),
        Value::Timestamp(clock.now()),
    );

    MapOutcome::Mapped(DocumentWrite::assigned(sku, fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::clock::FixedClock;
    use crate::store::DocumentKey;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    fn record(pairs: &[(&str, &str)]) -> Record {
        Record::new(
            2,
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect(),
        )
    }

    fn fixed_clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap())
    }

    fn expect_mapped(outcome: MapOutcome) -> DocumentWrite {
        match outcome {
            MapOutcome::Mapped(write) => write,
            MapOutcome::Skip => panic!("expected a mapped document"),
        }
    }

    #[test]
    fn test_sku_key_is_trimmed_code() {
        let write = expect_mapped(map_sku(&record(&[
            ("SKU", "  A1 "),
            ("DESCRIPCIÓN", " Widget "),
        ])));
        assert_eq!(write.key, DocumentKey::Assigned("A1".to_string()));
        assert_eq!(
            write.fields.get("descripcion"),
            Some(&Value::String("Widget".to_string()))
        );
        assert_eq!(write.fields.get("activo"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_sku_empty_key_skips() {
        assert_eq!(
            map_sku(&record(&[("SKU", ""), ("DESCRIPCIÓN", "Bad")])),
            MapOutcome::Skip
        );
        assert_eq!(
            map_sku(&record(&[("SKU", "nan"), ("DESCRIPCIÓN", "Bad")])),
            MapOutcome::Skip
        );
    }

    #[test]
    fn test_sku_missing_description_defaults_empty() {
        let write = expect_mapped(map_sku(&record(&[("SKU", "A1")])));
        assert_eq!(
            write.fields.get("descripcion"),
            Some(&Value::String(String::new()))
        );
    }

    #[test]
    fn test_fleet_emits_generated_key() {
        let clock = fixed_clock();
        let write = expect_mapped(map_fleet(
            &record(&[("IDVH", "VH-07"), ("Placa", " ABC123 ")]),
            &clock,
        ));
        assert_eq!(write.key, DocumentKey::Generated);
        assert_eq!(
            write.fields.get("vh_id"),
            Some(&Value::String("VH-07".to_string()))
        );
        assert_eq!(
            write.fields.get("placa"),
            Some(&Value::String("ABC123".to_string()))
        );
        assert_eq!(
            write.fields.get("fecha"),
            Some(&Value::Timestamp(clock.0))
        );
        assert_eq!(
            write.fields.get("productos"),
            Some(&Value::Array(Vec::new()))
        );
    }

    #[test]
    fn test_fleet_missing_vehicle_id_skips() {
        let clock = fixed_clock();
        assert_eq!(
            map_fleet(&record(&[("Placa", "ABC123")]), &clock),
            MapOutcome::Skip
        );
    }

    #[test]
    fn test_auxiliary_keyed_by_cedula_with_empty_contacts() {
        let write = expect_mapped(map_auxiliary(&record(&[
            ("Nombre", "Ana Pérez"),
            ("Cedula", " 1032456789 "),
            ("Rol", "Auxiliar de bodega"),
        ])));
        assert_eq!(write.key, DocumentKey::Assigned("1032456789".to_string()));
        assert_eq!(
            write.fields.get("cargo"),
            Some(&Value::String("Auxiliar de bodega".to_string()))
        );
        assert_eq!(
            write.fields.get("correo"),
            Some(&Value::String(String::new()))
        );
        assert_eq!(
            write.fields.get("telefono"),
            Some(&Value::String(String::new()))
        );
    }

    #[test]
    fn test_verifier_role_defaults_when_absent() {
        let clock = fixed_clock();
        let write = expect_mapped(map_verifier(
            &record(&[("Nombre", "Luis Rojas"), ("Cedula", "79456123")]),
            &clock,
        ));
        assert_eq!(
            write.fields.get("rol"),
            Some(&Value::String("verificador".to_string()))
        );
        assert_eq!(
            write.fields.get("fecha_creacion"),
            Some(&Value::Timestamp(clock.0))
        );
    }

    #[test]
    fn test_verifier_explicit_role_kept() {
        let clock = fixed_clock();
        let write = expect_mapped(map_verifier(
            &record(&[
                ("Nombre", "Luis Rojas"),
                ("Cedula", "79456123"),
                ("Rol", "supervisor"),
            ]),
            &clock,
        ));
        assert_eq!(
            write.fields.get("rol"),
            Some(&Value::String("supervisor".to_string()))
        );
    }

    #[test]
    fn test_inventory_baseline_from_sku_document() {
        let clock = fixed_clock();
        let mut fields = Fields::new();
        fields.insert("sku".to_string(), Value::String("A1".to_string()));
        fields.insert("descripcion".to_string(), Value::String("Widget".to_string()));
        let doc = StoredDocument {
            id: "A1".to_string(),
            fields,
        };

        let write = expect_mapped(inventory_baseline(&doc, &clock));
        assert_eq!(write.key, DocumentKey::Assigned("A1".to_string()));
        assert_eq!(write.fields.get("stock"), Some(&Value::Int(0)));
        assert_eq!(
            write.fields.get("ubicacion"),
            Some(&Value::String("Bodega Principal".to_string()))
        );
        assert_eq!(
            write.fields.get("fecha_actualizacion"),
            Some(&Value::Timestamp(clock.0))
        );
    }

    #[test]
    fn test_inventory_baseline_skips_malformed_sku_document() {
        let clock = fixed_clock();
        let doc = StoredDocument {
            id: "junk".to_string(),
            fields: Fields::new(),
        };
        assert_eq!(inventory_baseline(&doc, &clock), MapOutcome::Skip);
    }

    #[test]
    fn test_numeric_sku_codes_map_to_string_keys() {
        let mut fields = HashMap::new();
        fields.insert("SKU".to_string(), Value::Int(123));
        fields.insert(
            "DESCRIPCIÓN".to_string(),
            Value::String("Numeric code".to_string()),
        );
        let write = expect_mapped(map_sku(&Record::new(2, fields)));
        assert_eq!(write.key, DocumentKey::Assigned("123".to_string()));
    }
}

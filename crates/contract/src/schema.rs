//! Static entity schema registry.
//!
//! One row per entity kind: the wire function name, the docType tag, the
//! ordered field list with per-field coercions, the set of positionally
//! required non-empty arguments, which argument becomes the primary key,
//! the declared secondary index, and two behavioral flags. The insert
//! handlers differ only in this data, so the table is the single source of
//! truth for validation and document layout.
//!
//! Guard flags and payload flags vary between kinds for no documented
//! reason in the system this ledger replicates; both are preserved
//! per-schema rather than unified.

use clinledger_types::{ContractError, Result};

/// How a positional argument is coerced into its stored field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Stored as the supplied string.
    None,
    /// Parsed as an integer; unparsable input stores null.
    Integer,
    /// Stored lowercased.
    Lowercase,
}

/// One named field of an entity document, in positional order.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Stored field name.
    pub name: &'static str,
    /// Coercion applied to the raw argument.
    pub coercion: Coercion,
}

/// A declared secondary index for an entity kind.
#[derive(Debug, Clone, Copy)]
pub struct IndexSpec {
    /// Index name, the composite key's first part.
    pub name: &'static str,
    /// Whether the docType tag precedes the key value in the components.
    pub with_doc_type: bool,
}

/// Schema row for one entity kind.
#[derive(Debug, Clone, Copy)]
pub struct EntitySchema {
    /// Wire name the dispatcher routes on.
    pub function: &'static str,
    /// Tag stored under `docType`.
    pub doc_type: &'static str,
    /// Ordered field list; its length is the handler's arity.
    pub fields: &'static [FieldSpec],
    /// 0-based positions that must be non-empty, ascending.
    pub required: &'static [usize],
    /// 0-based position of the argument used as the primary key.
    pub key_field: usize,
    /// Declared secondary index, if any.
    pub index: Option<IndexSpec>,
    /// Whether the handler checks for an existing record before writing.
    pub checks_existence: bool,
    /// Whether a successful insert returns the stored record as payload.
    pub returns_record: bool,
}

impl EntitySchema {
    /// Declared argument count.
    #[must_use]
    pub const fn arity(&self) -> usize {
        self.fields.len()
    }

    /// Checks argument count and required non-empty positions.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Arity`] on a count mismatch, or
    /// [`ContractError::Validation`] naming the first (lowest) offending
    /// 1-based position when a required argument is empty.
    pub fn validate<'a>(&self, args: &'a [String]) -> Result<&'a [String]> {
        if args.len() != self.arity() {
            return Err(ContractError::Arity {
                function: self.function.to_string(),
                expected: self.arity(),
                got: args.len(),
            });
        }
        for &position in self.required {
            if args[position].is_empty() {
                return Err(ContractError::Validation { position: position + 1 });
            }
        }
        Ok(args)
    }

    /// The primary key value within validated arguments.
    #[must_use]
    pub fn primary_key<'a>(&self, args: &'a [String]) -> &'a str {
        &args[self.key_field]
    }
}

const fn field(name: &'static str) -> FieldSpec {
    FieldSpec { name, coercion: Coercion::None }
}

const fn int_field(name: &'static str) -> FieldSpec {
    FieldSpec { name, coercion: Coercion::Integer }
}

const fn lower_field(name: &'static str) -> FieldSpec {
    FieldSpec { name, coercion: Coercion::Lowercase }
}

const fn key_index(name: &'static str) -> Option<IndexSpec> {
    Some(IndexSpec { name, with_doc_type: false })
}

/// All entity kinds this ledger stores.
pub const SCHEMAS: &[EntitySchema] = &[
    EntitySchema {
        function: "insertPatient",
        doc_type: "patients",
        fields: &[
            field("rowId"),
            field("subjectId"),
            field("gender"),
            field("dob"),
            field("dod"),
            field("dodHosp"),
            field("dodSsn"),
            int_field("expireFlag"),
        ],
        required: &[0, 1, 2, 3, 7],
        key_field: 1,
        index: Some(IndexSpec { name: "docType~subjectId", with_doc_type: true }),
        checks_existence: false,
        returns_record: true,
    },
    EntitySchema {
        function: "insertAdmission",
        doc_type: "admission",
        fields: &[
            field("rowId"),
            field("subjectId"),
            field("hadmId"),
            field("admittime"),
            field("dischtime"),
            field("deathtime"),
            field("admissionType"),
            field("admissionLocation"),
            field("dischargeLocation"),
            field("insurance"),
            field("language"),
            field("religion"),
            field("maritalStatus"),
            field("ethnicity"),
            field("edregtime"),
            field("edouttime"),
            field("diagnosis"),
            field("hospitalExpireFlag"),
            field("hasCharteventsData"),
        ],
        required: &[0, 1, 2, 3, 4, 6, 7, 8, 9, 13, 18],
        key_field: 2,
        index: key_index("hadmId"),
        checks_existence: true,
        returns_record: false,
    },
    EntitySchema {
        function: "insertIcustay",
        doc_type: "icustay",
        fields: &[
            field("rowId"),
            field("subjectId"),
            field("hadmId"),
            field("icustayId"),
            field("dbsource"),
            field("firstCareunit"),
            field("lastCareunit"),
            field("firstWardid"),
            field("lastWardid"),
            field("intime"),
            field("outtime"),
            field("los"),
        ],
        required: &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
        key_field: 3,
        index: key_index("icustayId"),
        checks_existence: true,
        returns_record: false,
    },
    EntitySchema {
        function: "insertService",
        doc_type: "service",
        fields: &[
            field("rowId"),
            field("subjectId"),
            field("hadmId"),
            field("transfertime"),
            field("prevService"),
            field("currService"),
        ],
        required: &[0, 1, 2, 3],
        key_field: 0,
        index: key_index("rowId"),
        checks_existence: false,
        returns_record: false,
    },
    EntitySchema {
        function: "insertTransfer",
        doc_type: "transfer",
        fields: &[
            field("rowId"),
            field("subjectId"),
            field("hadmId"),
            field("icustayId"),
            field("dbsource"),
            field("eventtype"),
            field("prevCareunit"),
            field("currCareunit"),
            field("prevWardid"),
            field("currWardid"),
            field("intime"),
            field("outtime"),
            field("los"),
        ],
        required: &[0, 1, 2],
        key_field: 0,
        index: key_index("rowId"),
        checks_existence: false,
        returns_record: false,
    },
    EntitySchema {
        function: "insertDcpt",
        doc_type: "d_cpt",
        fields: &[
            field("rowId"),
            field("category"),
            field("sectionrange"),
            field("sectionheader"),
            field("subsectionrange"),
            field("subsectionheader"),
            field("codesuffix"),
            field("mincodeinsubsection"),
            field("maxcodeinsubsection"),
        ],
        required: &[0, 1, 2, 3, 4, 5],
        key_field: 0,
        index: key_index("rowId"),
        checks_existence: true,
        returns_record: false,
    },
    EntitySchema {
        function: "insertDicdDiagnose",
        doc_type: "d_icd_diagnoses",
        fields: &[
            field("rowId"),
            field("icd9Code"),
            field("shortTitle"),
            field("longTitle"),
        ],
        required: &[0, 1, 2, 3],
        key_field: 1,
        index: key_index("icd9Code"),
        checks_existence: true,
        returns_record: false,
    },
    EntitySchema {
        function: "insertDicdProcedure",
        doc_type: "d_icd_procedures",
        fields: &[
            field("rowId"),
            field("icd9Code"),
            field("shortTitle"),
            field("longTitle"),
        ],
        required: &[0, 1, 2, 3],
        key_field: 1,
        index: key_index("icd9Code"),
        checks_existence: true,
        returns_record: false,
    },
    EntitySchema {
        function: "insertDitem",
        doc_type: "d_items",
        fields: &[
            field("rowId"),
            field("itemid"),
            field("label"),
            field("abbreviation"),
            field("dbsource"),
            field("linksto"),
            field("category"),
            field("unitname"),
            field("paramType"),
            field("conceptid"),
        ],
        required: &[0, 1],
        key_field: 1,
        index: key_index("itemid"),
        checks_existence: false,
        returns_record: true,
    },
    // Shares the d_items tag with insertDitem; kept as stored data.
    EntitySchema {
        function: "insertDlabitem",
        doc_type: "d_items",
        fields: &[
            field("rowId"),
            field("itemid"),
            field("label"),
            field("fluid"),
            field("category"),
            field("loincCode"),
        ],
        required: &[0, 1, 2, 3, 4],
        key_field: 1,
        index: key_index("itemid"),
        checks_existence: true,
        returns_record: false,
    },
    // Keyed by itemid, not rowId.
    EntitySchema {
        function: "insertChartevent",
        doc_type: "chartevent",
        fields: &[
            field("rowId"),
            field("subjectId"),
            field("hadmId"),
            field("icustayId"),
            field("itemid"),
            field("charttime"),
            field("storetime"),
            field("cgid"),
            field("value"),
            field("valuenum"),
            field("valueuom"),
            field("warning"),
            field("error"),
            field("resultstatus"),
            field("stopped"),
        ],
        required: &[0, 1],
        key_field: 4,
        index: key_index("itemid"),
        checks_existence: true,
        returns_record: false,
    },
    EntitySchema {
        function: "insertNoteevent",
        doc_type: "noteevent",
        fields: &[
            field("rowId"),
            field("subjectId"),
            field("hadmId"),
            field("chartdata"),
            field("charttime"),
            field("storetime"),
            field("category"),
            field("description"),
            field("cgid"),
            field("iserror"),
            field("text"),
        ],
        required: &[0, 1],
        key_field: 0,
        index: key_index("rowId"),
        checks_existence: false,
        returns_record: false,
    },
    EntitySchema {
        function: "insertCptevent",
        doc_type: "cptevent",
        fields: &[
            field("rowId"),
            field("subjectId"),
            field("hadmId"),
            field("costcenter"),
            field("chartdate"),
            field("cptCd"),
            field("cptNumber"),
            field("cptSuffix"),
            field("ticketIdseq"),
            field("sectionheader"),
            field("subsectionheader"),
            field("description"),
        ],
        required: &[0, 1, 2, 3, 6],
        key_field: 5,
        index: key_index("cptCd"),
        checks_existence: true,
        returns_record: false,
    },
    EntitySchema {
        function: "insertOutputevent",
        doc_type: "outputevent",
        fields: &[
            field("rowId"),
            field("subjectId"),
            field("hadmId"),
            field("icustayId"),
            field("charttime"),
            field("itemid"),
            field("value"),
            field("valueuom"),
            field("storetime"),
            field("cgid"),
            field("stopped"),
            field("newbottle"),
            field("iserror"),
        ],
        required: &[0, 1],
        key_field: 0,
        index: key_index("rowId"),
        checks_existence: true,
        returns_record: false,
    },
    EntitySchema {
        function: "insertDatetimeevent",
        doc_type: "datetimeevent",
        fields: &[
            field("rowId"),
            int_field("subjectId"),
            int_field("hadmId"),
            int_field("icustayId"),
            int_field("itemid"),
            field("charttime"),
            field("storetime"),
            int_field("cgid"),
            field("value"),
            lower_field("valueuom"),
            int_field("warning"),
            int_field("error"),
            lower_field("resultstatus"),
            lower_field("stopped"),
        ],
        required: &[0, 1, 4, 5, 6, 7, 9],
        key_field: 0,
        index: key_index("rowId"),
        checks_existence: true,
        returns_record: false,
    },
    EntitySchema {
        function: "insertLabevent",
        doc_type: "labevent",
        fields: &[
            field("rowId"),
            int_field("subjectId"),
            int_field("hadmId"),
            int_field("itemid"),
            field("charttime"),
            lower_field("value"),
            field("valuenum"),
            lower_field("valueuom"),
            lower_field("flag"),
        ],
        required: &[0, 1, 3],
        key_field: 0,
        index: key_index("rowId"),
        checks_existence: true,
        returns_record: false,
    },
    EntitySchema {
        function: "insertMicrobiologyevent",
        doc_type: "microbiologyevent",
        fields: &[
            field("rowId"),
            field("subjectId"),
            field("hadmId"),
            field("chartdate"),
            field("charttime"),
            field("specItemid"),
            field("specTypeDesc"),
            field("orgItemid"),
            field("orgName"),
            field("isolateNum"),
            field("abItemid"),
            field("abName"),
            field("dilutionText"),
            field("dilutionComparison"),
            field("dilutionValue"),
            field("interpretation"),
        ],
        required: &[0, 1],
        key_field: 0,
        index: key_index("rowId"),
        checks_existence: true,
        returns_record: false,
    },
    EntitySchema {
        function: "insertDrgcode",
        doc_type: "drgcode",
        fields: &[
            field("rowId"),
            field("subjectId"),
            field("hadmId"),
            field("drgType"),
            field("drgCode"),
            field("description"),
            field("drgSeverity"),
            field("drgMortality"),
        ],
        required: &[0, 1, 2, 3, 4],
        key_field: 0,
        index: key_index("rowId"),
        checks_existence: true,
        returns_record: false,
    },
    EntitySchema {
        function: "insertPrescription",
        doc_type: "prescription",
        fields: &[
            field("rowId"),
            field("subjectId"),
            field("hadmId"),
            field("icustayId"),
            field("startdate"),
            field("enddate"),
            field("drugType"),
            field("drug"),
            field("drugNamePoe"),
            field("drugNameGeneric"),
            field("formularyDrugCd"),
            field("gsn"),
            field("ndc"),
            field("prodStrength"),
            field("doseValRx"),
            field("doseUnitRx"),
            field("formValDisp"),
            field("formUnitDisp"),
            field("route"),
        ],
        required: &[0, 1, 2, 6, 7],
        key_field: 0,
        index: key_index("rowId"),
        checks_existence: false,
        returns_record: true,
    },
    EntitySchema {
        function: "insertCallout",
        doc_type: "callout",
        fields: &[
            field("rowId"),
            field("subjectId"),
            field("hadmId"),
            field("submitWardid"),
            field("submitCareunit"),
            field("currWardid"),
            field("currCareunit"),
            field("calloutWardid"),
            field("calloutService"),
            field("requestTele"),
            field("requestResp"),
            field("requestCdiff"),
            field("requestMrsa"),
            field("requestVre"),
            field("calloutStatus"),
            field("calloutOutcome"),
            field("dischargeWardid"),
            field("acknowledgeStatus"),
            field("createtime"),
            field("updatetime"),
            field("acknowledgetime"),
            field("outcometime"),
            field("firstreservationtime"),
            field("currentreservationtime"),
        ],
        required: &[0, 1, 2, 8, 9, 10, 11, 12, 13, 14, 15, 17, 18, 19, 21],
        key_field: 0,
        index: key_index("rowId"),
        checks_existence: true,
        returns_record: false,
    },
    EntitySchema {
        function: "insertCaregiver",
        doc_type: "caregiver",
        fields: &[
            field("rowId"),
            field("cgid"),
            field("label"),
            field("description"),
        ],
        required: &[0, 1],
        key_field: 1,
        index: key_index("cgid"),
        checks_existence: true,
        returns_record: false,
    },
    EntitySchema {
        function: "insertDiagnoseIcd",
        doc_type: "diagnoseIcd",
        fields: &[
            field("rowId"),
            field("subjectId"),
            field("hadmId"),
            field("seqNum"),
            field("icd9Code"),
        ],
        required: &[0, 1, 2],
        key_field: 0,
        index: key_index("rowId"),
        checks_existence: true,
        returns_record: false,
    },
    EntitySchema {
        function: "insertProcedureIcd",
        doc_type: "procedureIcd",
        fields: &[
            field("rowId"),
            field("subjectId"),
            field("hadmId"),
            field("seqNum"),
            field("icd9Code"),
        ],
        required: &[0, 1, 2],
        key_field: 0,
        index: key_index("rowId"),
        checks_existence: true,
        returns_record: false,
    },
    EntitySchema {
        function: "insertInputeventMv",
        doc_type: "inputeventmv",
        fields: &[
            field("rowId"),
            field("subjectId"),
            field("hadmId"),
            field("icustayId"),
            field("starttime"),
            field("endtime"),
            field("itemid"),
            field("amount"),
            field("amountuom"),
            field("rate"),
            field("rateuom"),
            field("storetime"),
            field("cgid"),
            field("orderid"),
            field("linkorderid"),
            field("ordercategoryname"),
            field("secondarycategoryname"),
            field("ordercomponenttypedescription"),
            field("ordercategorydescription"),
            field("patientweight"),
            field("totalamount"),
            field("totalamountuom"),
            field("isopenbag"),
            field("continueinnextdept"),
            field("cancelreason"),
            field("statusdescription"),
            field("commentsEditedby"),
            field("commentsCanceledby"),
            field("commentsDate"),
            field("originalamount"),
            field("originalrate"),
        ],
        required: &[0, 1],
        key_field: 0,
        index: key_index("rowId"),
        checks_existence: false,
        returns_record: true,
    },
    EntitySchema {
        function: "insertInputeventCv",
        doc_type: "inputeventcv",
        fields: &[
            field("rowId"),
            field("subjectId"),
            field("hadmId"),
            field("icustayId"),
            field("charttime"),
            field("itemid"),
            field("amount"),
            field("amountuom"),
            field("rate"),
            field("rateuom"),
            field("storetime"),
            field("cgid"),
            field("orderid"),
            field("linkorderid"),
            field("stopped"),
            field("newbottle"),
            field("originalamountuom"),
            field("originalroute"),
            field("originalrate"),
            field("originalrateuom"),
            field("originalsite"),
        ],
        required: &[0, 1],
        key_field: 0,
        index: key_index("rowId"),
        checks_existence: true,
        returns_record: false,
    },
    EntitySchema {
        function: "insertProcedureeventMv",
        doc_type: "procedureeventmv",
        fields: &[
            field("rowId"),
            field("subjectId"),
            field("hadmId"),
            field("icustayId"),
            field("starttime"),
            field("endtime"),
            field("itemid"),
            field("value"),
            field("valueuom"),
            field("location"),
            field("locationcategory"),
            field("storetime"),
            field("cgid"),
            field("orderid"),
            field("linkorderid"),
            field("ordercategoryname"),
            field("secondaryordercategoryname"),
            field("ordercategorydescription"),
            field("isopenbag"),
            field("continueinnextdept"),
            field("cancelreason"),
            field("statusdescription"),
            field("commentsEditedby"),
            field("commentsCanceledby"),
            field("commentsDate"),
        ],
        required: &[0, 1, 2],
        key_field: 0,
        index: key_index("rowId"),
        checks_existence: true,
        returns_record: false,
    },
];

/// Looks up a schema row by wire function name.
#[must_use]
pub fn schema_for(function: &str) -> Option<&'static EntitySchema> {
    SCHEMAS.iter().find(|schema| schema.function == function)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use clinledger_state::COMPOSITE_KEY_DELIMITER;

    use super::*;

    fn args(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("v{i}")).collect()
    }

    #[test]
    fn test_table_is_internally_consistent() {
        let mut seen = std::collections::HashSet::new();
        for schema in SCHEMAS {
            assert!(seen.insert(schema.function), "duplicate function {}", schema.function);
            assert!(!schema.doc_type.is_empty());
            assert!(
                schema.key_field < schema.arity(),
                "{}: key field out of range",
                schema.function
            );
            assert!(
                schema.required.windows(2).all(|w| w[0] < w[1]),
                "{}: required positions must be strictly ascending",
                schema.function
            );
            for &position in schema.required {
                assert!(position < schema.arity(), "{}: required out of range", schema.function);
            }
            if let Some(index) = &schema.index {
                assert!(!index.name.contains(COMPOSITE_KEY_DELIMITER));
            }
        }
    }

    #[test]
    fn test_declared_arities() {
        let expect = [
            ("insertPatient", 8),
            ("insertAdmission", 19),
            ("insertIcustay", 12),
            ("insertPrescription", 19),
            ("insertInputeventMv", 31),
            ("insertInputeventCv", 21),
            ("insertProcedureeventMv", 25),
            ("insertCallout", 24),
        ];
        for (function, arity) in expect {
            assert_eq!(schema_for(function).unwrap().arity(), arity, "{function}");
        }
    }

    #[test]
    fn test_validate_rejects_wrong_arity() {
        let schema = schema_for("insertPatient").unwrap();

        let err = schema.validate(&args(7)).expect_err("one short");
        assert!(matches!(err, ContractError::Arity { expected: 8, got: 7, .. }));

        let err = schema.validate(&args(9)).expect_err("one long");
        assert!(matches!(err, ContractError::Arity { expected: 8, got: 9, .. }));
    }

    #[test]
    fn test_validate_names_first_offending_position() {
        let schema = schema_for("insertPatient").unwrap();
        let mut bad = args(8);
        bad[3].clear();
        bad[7].clear();

        let err = schema.validate(&bad).expect_err("should reject");
        assert!(matches!(err, ContractError::Validation { position: 4 }));
    }

    #[test]
    fn test_validate_allows_empty_optional_fields() {
        let schema = schema_for("insertPatient").unwrap();
        let mut ok = args(8);
        ok[4].clear(); // dod is optional
        ok[5].clear();
        ok[6].clear();
        assert!(schema.validate(&ok).is_ok());
    }

    #[test]
    fn test_primary_key_positions() {
        let cases = [
            ("insertPatient", 1),
            ("insertAdmission", 2),
            ("insertIcustay", 3),
            ("insertChartevent", 4),
            ("insertCptevent", 5),
            ("insertCaregiver", 1),
            ("insertPrescription", 0),
        ];
        for (function, key_field) in cases {
            assert_eq!(schema_for(function).unwrap().key_field, key_field, "{function}");
        }
    }

    #[test]
    fn test_unknown_function_has_no_schema() {
        assert!(schema_for("updatePatient").is_none());
    }
}

//! Logical field groups. Each group shares one storage key per entity, so
//! an autosave of one group never touches another group's fields.

use bridaldesk_core::{FieldValue, Snapshot, snapshot};

pub const TOTAL_PAID_FIELD: &str = "totalPaid";
pub const REMAINING_FIELD: &str = "remaining";
pub const STATUS_FIELD: &str = "status";

/// A list-valued field and the item fields every row must fill in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSpec {
    pub field: String,
    pub required: Vec<String>,
}

impl ListSpec {
    pub fn new(field: &str, required: &[&str]) -> Self {
        Self {
            field: field.to_string(),
            required: required.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Where a group keeps its payment rows and the amount they settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSpec {
    pub list_field: String,
    pub amount_field: String,
    pub total_field: String,
}

impl LedgerSpec {
    pub fn new(list_field: &str, amount_field: &str, total_field: &str) -> Self {
        Self {
            list_field: list_field.to_string(),
            amount_field: amount_field.to_string(),
            total_field: total_field.to_string(),
        }
    }

    pub fn derived_fields() -> [&'static str; 3] {
        [TOTAL_PAID_FIELD, REMAINING_FIELD, STATUS_FIELD]
    }

    pub fn is_derived(field: &str) -> bool {
        Self::derived_fields().contains(&field)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupSpec {
    pub name: String,
    pub defaults: Snapshot,
    pub lists: Vec<ListSpec>,
    pub ledger: Option<LedgerSpec>,
}

impl GroupSpec {
    pub fn new(name: &str, defaults: Snapshot) -> Self {
        Self {
            name: name.to_string(),
            defaults,
            lists: Vec::new(),
            ledger: None,
        }
    }

    pub fn with_list(mut self, list: ListSpec) -> Self {
        self.defaults
            .entry(list.field.clone())
            .or_insert_with(|| FieldValue::List(Vec::new()));
        self.lists.push(list);
        self
    }

    /// Adds the payment list (if not already declared) and the ledger.
    pub fn with_ledger(mut self, ledger: LedgerSpec) -> Self {
        if self.list(&ledger.list_field).is_none() {
            self = self.with_list(ListSpec::new(&ledger.list_field, &[ledger.amount_field.as_str()]));
        }
        self.defaults
            .entry(ledger.total_field.clone())
            .or_insert(FieldValue::Null);
        self.ledger = Some(ledger);
        self
    }

    pub fn list(&self, field: &str) -> Option<&ListSpec> {
        self.lists.iter().find(|l| l.field == field)
    }
}

fn blank_fields(fields: &[&str]) -> Snapshot {
    snapshot(fields.iter().map(|f| (*f, FieldValue::text(""))))
}

/// The dashboard's field groups.
pub fn catalog() -> Vec<GroupSpec> {
    vec![
        GroupSpec::new(
            "detail",
            blank_fields(&[
                "readyDekorasi",
                "readyMakeup",
                "lokasiAcara",
                "tanggalAcara",
                "catatan",
            ]),
        ),
        GroupSpec::new(
            "fitting",
            blank_fields(&["lingkarDada", "lingkarPinggang", "panjangBaju", "tanggalFitting"]),
        ),
        GroupSpec::new("fitting-photos", Snapshot::new())
            .with_list(ListSpec::new("photos", &["image"])),
        GroupSpec::new("clothes-list", Snapshot::new())
            .with_list(ListSpec::new("items", &["nama"])),
        GroupSpec::new("tent-sizing", blank_fields(&["catatan"]))
            .with_list(ListSpec::new("sizes", &["ukuran"])),
        GroupSpec::new("invoice", blank_fields(&["nomorInvoice", "jatuhTempo"]))
            .with_list(ListSpec::new("customItems", &["deskripsi"]))
            .with_ledger(LedgerSpec::new("payments", "jumlah", "totalDue")),
    ]
}

pub fn find(name: &str) -> Option<GroupSpec> {
    catalog().into_iter().find(|g| g.name == name)
}

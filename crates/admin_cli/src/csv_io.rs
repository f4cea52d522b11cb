//! CSV shapes used by the import and export commands.

use std::io::{Read, Write};

use engine::{Plant, Supplier, SupplierNew};
use serde::{Deserialize, Serialize};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One supplier row as found in an import file. Header names match the
/// field names.
#[derive(Debug, Deserialize)]
struct SupplierImportRow {
    type_id: i32,
    name: String,
    contact_person: String,
    phone: String,
    #[serde(default)]
    email: Option<String>,
    bank_name: String,
    account_number: String,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    remark: Option<String>,
}

#[derive(Serialize)]
struct SupplierExportRow<'a> {
    id: i32,
    type_id: i32,
    name: &'a str,
    contact_person: &'a str,
    phone: &'a str,
    email: Option<&'a str>,
    bank_name: &'a str,
    account_number: &'a str,
    address: Option<&'a str>,
    remark: Option<&'a str>,
    create_at: String,
}

#[derive(Serialize)]
struct PlantExportRow<'a> {
    id: i32,
    name: &'a str,
    category: Option<&'a str>,
    spec: &'a str,
    unit: &'a str,
    quantity: String,
    price: String,
    location: Option<&'a str>,
    remark: Option<&'a str>,
    low_stock: bool,
    update_at: String,
}

/// Parse supplier rows. Values are kept as text, so long account numbers
/// survive unchanged.
pub fn read_suppliers(reader: impl Read) -> Result<Vec<SupplierNew>, BoxError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<SupplierImportRow>().enumerate() {
        let row = record.map_err(|err| format!("row {}: {err}", index + 1))?;
        rows.push(SupplierNew {
            type_id: row.type_id,
            name: row.name,
            contact_person: row.contact_person,
            phone: row.phone,
            email: row.email,
            bank_name: row.bank_name,
            account_number: row.account_number,
            address: row.address,
            remark: row.remark,
        });
    }
    Ok(rows)
}

pub fn write_suppliers(writer: impl Write, suppliers: &[Supplier]) -> Result<(), BoxError> {
    let mut writer = csv::Writer::from_writer(writer);
    for supplier in suppliers {
        writer.serialize(SupplierExportRow {
            id: supplier.id,
            type_id: supplier.type_id,
            name: &supplier.name,
            contact_person: &supplier.contact_person,
            phone: &supplier.phone,
            email: supplier.email.as_deref(),
            bank_name: &supplier.bank_name,
            account_number: &supplier.account_number,
            address: supplier.address.as_deref(),
            remark: supplier.remark.as_deref(),
            create_at: supplier.create_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_plants(writer: impl Write, plants: &[Plant]) -> Result<(), BoxError> {
    let mut writer = csv::Writer::from_writer(writer);
    for plant in plants {
        writer.serialize(PlantExportRow {
            id: plant.id,
            name: &plant.name,
            category: plant.category.as_deref(),
            spec: &plant.spec,
            unit: &plant.unit,
            quantity: plant.quantity.to_string(),
            price: plant.price.to_string(),
            location: plant.location.as_deref(),
            remark: plant.remark.as_deref(),
            low_stock: plant.is_low_stock(),
            update_at: plant.update_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

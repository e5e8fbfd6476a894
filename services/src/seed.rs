// services/src/seed.rs
//! Demo data set loaded by the server at startup and by the scenario tests.

use chrono::{NaiveDate, Utc};
use log::info;
use std::sync::Arc;
use uuid::Uuid;

use hospital_models::{
    Department, Disease, DocumentType, Employee, Gender, HospitalResult, Medication, Patient,
    Person, Role, Site, Specialty,
};
use hospital_storage::HospitalStore;

use crate::identity::PasswordHasher;

/// Handles to the seeded rows, so callers can log in and reference them
/// without re-querying by name.
#[derive(Debug, Clone)]
pub struct SeedData {
    pub site_north: Site,
    pub site_south: Site,
    pub dept_general_north: Department,
    pub dept_pediatrics_north: Department,
    pub dept_general_south: Department,
    pub admin: Uuid,
    pub doctor_north: Uuid,
    pub doctor_south: Uuid,
    pub nurse_north: Uuid,
    pub patient: Uuid,
    pub amoxicillin: Medication,
    pub ibuprofen: Medication,
    pub influenza: Disease,
    pub hypertension: Disease,
}

fn person(
    first: &str,
    last: &str,
    document: &str,
    email: &str,
    birth: Option<NaiveDate>,
) -> Person {
    Person {
        id: Uuid::new_v4(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        document_type: DocumentType::CC,
        document_number: document.to_string(),
        email: email.to_string(),
        birth_date: birth,
        gender: Some(Gender::Other),
        address: None,
        phone: None,
        city: None,
    }
}

fn employee(
    person_id: Uuid,
    role: Role,
    site: Uuid,
    department: Option<Uuid>,
    specialty: Option<Uuid>,
    password_hash: String,
) -> Employee {
    Employee {
        person_id,
        active: true,
        role,
        home_site: site,
        department,
        specialty,
        password_hash,
        hired_at: Utc::now(),
    }
}

/// Seeds two sites with staff, catalogs and stocked inventory. Every
/// employee's password is "changeme1".
pub async fn load_demo_data(
    store: &Arc<dyn HospitalStore>,
    hasher: &Arc<dyn PasswordHasher>,
) -> HospitalResult<SeedData> {
    let password_hash = hasher.hash("changeme1");

    let site_north = Site {
        id: Uuid::new_v4(),
        name: "Sede Norte".to_string(),
        city: "Bogotá".to_string(),
        address: "Calle 100 #15-20".to_string(),
        phone: "601-555-0100".to_string(),
        central_node: true,
    };
    let site_south = Site {
        id: Uuid::new_v4(),
        name: "Sede Sur".to_string(),
        city: "Bogotá".to_string(),
        address: "Carrera 30 #1-45".to_string(),
        phone: "601-555-0200".to_string(),
        central_node: false,
    };
    store.insert_site(site_north.clone()).await?;
    store.insert_site(site_south.clone()).await?;

    let dept_general_north = Department {
        id: Uuid::new_v4(),
        site_id: site_north.id,
        name: "Medicina General".to_string(),
    };
    let dept_pediatrics_north = Department {
        id: Uuid::new_v4(),
        site_id: site_north.id,
        name: "Pediatría".to_string(),
    };
    let dept_general_south = Department {
        id: Uuid::new_v4(),
        site_id: site_south.id,
        name: "Medicina General".to_string(),
    };
    store.insert_department(dept_general_north.clone()).await?;
    store.insert_department(dept_pediatrics_north.clone()).await?;
    store.insert_department(dept_general_south.clone()).await?;

    let general_medicine = Specialty {
        id: Uuid::new_v4(),
        name: "Medicina General".to_string(),
    };
    store.insert_specialty(general_medicine.clone()).await?;

    let admin_person = person("Laura", "Cifuentes", "10000001", "admin@hospital.test", None);
    let admin = admin_person.id;
    store
        .insert_employee(
            admin_person,
            employee(admin, Role::Administrator, site_north.id, None, None, password_hash.clone()),
        )
        .await?;

    let doc_n_person = person(
        "Mateo",
        "Rincón",
        "10000002",
        "mrincon@hospital.test",
        NaiveDate::from_ymd_opt(1984, 3, 12),
    );
    let doctor_north = doc_n_person.id;
    store
        .insert_employee(
            doc_n_person,
            employee(
                doctor_north,
                Role::Doctor,
                site_north.id,
                Some(dept_general_north.id),
                Some(general_medicine.id),
                password_hash.clone(),
            ),
        )
        .await?;

    let doc_s_person = person(
        "Carolina",
        "Vélez",
        "10000003",
        "cvelez@hospital.test",
        NaiveDate::from_ymd_opt(1979, 11, 2),
    );
    let doctor_south = doc_s_person.id;
    store
        .insert_employee(
            doc_s_person,
            employee(
                doctor_south,
                Role::Doctor,
                site_south.id,
                Some(dept_general_south.id),
                Some(general_medicine.id),
                password_hash.clone(),
            ),
        )
        .await?;

    let nurse_person = person("Andrés", "Pardo", "10000004", "apardo@hospital.test", None);
    let nurse_north = nurse_person.id;
    store
        .insert_employee(
            nurse_person,
            employee(
                nurse_north,
                Role::Nurse,
                site_north.id,
                Some(dept_general_north.id),
                None,
                password_hash,
            ),
        )
        .await?;

    let patient_person = person(
        "Sofía",
        "Martínez",
        "20000001",
        "smartinez@example.test",
        NaiveDate::from_ymd_opt(1992, 6, 30),
    );
    let patient = patient_person.id;
    store
        .insert_patient(
            patient_person,
            Patient {
                person_id: patient,
                code: String::new(),
                blood_type: Some("O+".to_string()),
                allergies: Some("Penicilina".to_string()),
                emergency_contact: Some("601-555-0303".to_string()),
                registered_at: Utc::now(),
            },
        )
        .await?;

    let amoxicillin = Medication {
        id: Uuid::new_v4(),
        name: "Amoxicilina 500mg".to_string(),
        active_ingredient: Some("Amoxicilina".to_string()),
        description: None,
        unit: "cápsula".to_string(),
        main_supplier: Some("Genfar".to_string()),
    };
    let ibuprofen = Medication {
        id: Uuid::new_v4(),
        name: "Ibuprofeno 400mg".to_string(),
        active_ingredient: Some("Ibuprofeno".to_string()),
        description: None,
        unit: "tableta".to_string(),
        main_supplier: Some("MK".to_string()),
    };
    store.insert_medication(amoxicillin.clone()).await?;
    store.insert_medication(ibuprofen.clone()).await?;

    store.upsert_inventory(site_north.id, amoxicillin.id, 120).await?;
    store.upsert_inventory(site_north.id, ibuprofen.id, 35).await?;
    store.upsert_inventory(site_south.id, amoxicillin.id, 8).await?;
    store.upsert_inventory(site_south.id, ibuprofen.id, 60).await?;

    let influenza = Disease {
        id: Uuid::new_v4(),
        name: "Influenza".to_string(),
    };
    let hypertension = Disease {
        id: Uuid::new_v4(),
        name: "Hipertensión arterial".to_string(),
    };
    store.insert_disease(influenza.clone()).await?;
    store.insert_disease(hypertension.clone()).await?;

    info!("demo data loaded: 2 sites, 4 employees, 1 patient");

    Ok(SeedData {
        site_north,
        site_south,
        dept_general_north,
        dept_pediatrics_north,
        dept_general_south,
        admin,
        doctor_north,
        doctor_south,
        nurse_north,
        patient,
        amoxicillin,
        ibuprofen,
        influenza,
        hypertension,
    })
}

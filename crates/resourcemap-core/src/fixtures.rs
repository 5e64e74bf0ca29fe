// SPDX-License-Identifier: AGPL-3.0
// ResourceMap Core - Sample listings
//
// Seed data for the in-memory sources, matching what the app shows
// before a backend is wired in.

use crate::donations::{Donation, DonationCategory, DonationStatus};
use crate::listing::FixtureSource;
use crate::requests::{AidRequest, RequestCategory, RequestStatus, Urgency};
use chrono::{DateTime, NaiveDate, Utc};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn donation(
    id: &str,
    title: &str,
    description: &str,
    category: DonationCategory,
    quantity: u32,
    location: &str,
    status: DonationStatus,
    created_at: DateTime<Utc>,
    donor_name: &str,
) -> Donation {
    Donation {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category,
        quantity,
        location: location.to_string(),
        status,
        created_at,
        donor_name: donor_name.to_string(),
    }
}

pub fn donations() -> Vec<Donation> {
    vec![
        donation(
            "1",
            "Cestas Básicas",
            "Cestas básicas completas para familias necessitadas",
            DonationCategory::Food,
            50,
            "São Paulo, SP",
            DonationStatus::Available,
            at(2025, 6, 1, 10, 0),
            "João Silva",
        ),
        donation(
            "2",
            "Roupas de Inverno",
            "Agasalhos, casacos e cobertores em bom estado",
            DonationCategory::Clothing,
            30,
            "Rio de Janeiro, RJ",
            DonationStatus::Available,
            at(2025, 6, 2, 14, 30),
            "Maria Santos",
        ),
        donation(
            "3",
            "Medicamentos Básicos",
            "Remédios para gripe, dor de cabeça e primeiros socorros",
            DonationCategory::Medicine,
            100,
            "Belo Horizonte, MG",
            DonationStatus::Reserved,
            at(2025, 6, 3, 9, 15),
            "Carlos Oliveira",
        ),
    ]
}

struct RequestSeed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    category: RequestCategory,
    quantity: u32,
    urgency: Urgency,
    location: &'static str,
    status: RequestStatus,
    created_at: DateTime<Utc>,
    organization: &'static str,
    contact_info: &'static str,
}

impl From<RequestSeed> for AidRequest {
    fn from(seed: RequestSeed) -> Self {
        Self {
            id: seed.id.to_string(),
            title: seed.title.to_string(),
            description: seed.description.to_string(),
            category: seed.category,
            quantity: seed.quantity,
            urgency: seed.urgency,
            location: seed.location.to_string(),
            status: seed.status,
            created_at: seed.created_at,
            organization: seed.organization.to_string(),
            contact_info: seed.contact_info.to_string(),
        }
    }
}

pub fn aid_requests() -> Vec<AidRequest> {
    let seeds = [
        RequestSeed {
            id: "1",
            title: "Alimentos para 100 famílias",
            description: "Urgente! Precisamos de cestas básicas para famílias afetadas pelas enchentes. Itens essenciais: arroz, feijão, óleo, açúcar.",
            category: RequestCategory::Food,
            quantity: 100,
            urgency: Urgency::High,
            location: "Porto Alegre, RS",
            status: RequestStatus::Open,
            created_at: at(2025, 6, 1, 8, 0),
            organization: "ONG Esperança",
            contact_info: "contato@esperanca.org.br",
        },
        RequestSeed {
            id: "2",
            title: "Roupas de inverno infantis",
            description: "Crianças de 0 a 12 anos precisam de agasalhos, casacos e sapatos fechados para o inverno.",
            category: RequestCategory::Clothing,
            quantity: 50,
            urgency: Urgency::Medium,
            location: "São Paulo, SP",
            status: RequestStatus::Open,
            created_at: at(2025, 6, 2, 10, 30),
            organization: "Casa da Criança",
            contact_info: "(11) 99999-9999",
        },
        RequestSeed {
            id: "3",
            title: "Medicamentos para hipertensão",
            description: "Idosos da comunidade precisam de medicamentos para controle da pressão arterial.",
            category: RequestCategory::Medicine,
            quantity: 30,
            urgency: Urgency::High,
            location: "Belo Horizonte, MG",
            status: RequestStatus::Matched,
            created_at: at(2025, 6, 3, 14, 15),
            organization: "Centro Comunitário Vila Nova",
            contact_info: "vilanova@email.com",
        },
        RequestSeed {
            id: "4",
            title: "Material escolar",
            description: "Cadernos, lápis, canetas e material didático para crianças em idade escolar.",
            category: RequestCategory::Education,
            quantity: 80,
            urgency: Urgency::Low,
            location: "Recife, PE",
            status: RequestStatus::Open,
            created_at: at(2025, 6, 4, 9, 45),
            organization: "Escola Comunitária Futuro",
            contact_info: "(81) 88888-8888",
        },
        RequestSeed {
            id: "5",
            title: "Produtos de higiene pessoal",
            description: "Sabonetes, shampoo, pasta de dente, fraldas e absorventes para famílias carentes.",
            category: RequestCategory::Hygiene,
            quantity: 60,
            urgency: Urgency::Medium,
            location: "Fortaleza, CE",
            status: RequestStatus::Fulfilled,
            created_at: at(2025, 5, 28, 16, 20),
            organization: "Associação Mãos Solidárias",
            contact_info: "maossolidarias@gmail.com",
        },
    ];

    seeds.into_iter().map(AidRequest::from).collect()
}

pub fn donation_source() -> FixtureSource<Donation> {
    FixtureSource::new(donations())
}

pub fn aid_request_source() -> FixtureSource<AidRequest> {
    FixtureSource::new(aid_requests())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_data_is_well_formed() {
        let donations = donations();
        let requests = aid_requests();
        assert_eq!(donations.len(), 3);
        assert_eq!(requests.len(), 5);
        assert!(donations.iter().all(|d| d.quantity > 0 && d.created_at.timestamp() > 0));
        assert_eq!(requests[4].created_at, at(2025, 5, 28, 16, 20));
    }
}

//! Replacement-map construction and party requisites rendering

use rust_decimal::Decimal;

use ru_text::{amount_in_words, format_amount_whole, format_date_compact, month_name_genitive};

use crate::model::{Agreement, Executor, Party, PartyKind};

use chrono::Datelike;

/// Ordered placeholder-to-value mapping. The vocabulary is mutually
/// prefix-disjoint, so application order does not matter.
#[derive(Debug, Clone, Default)]
pub struct ReplacementMap {
    pairs: Vec<(String, String)>,
}

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.pairs.push((key.to_string(), value.into()));
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Contract preamble clause for a client, by entity type
pub fn build_preamble(party: &Party) -> String {
    let full_name = party.representative.full();

    match &party.kind {
        PartyKind::SoleProprietor => format!(
            "Индивидуальный предприниматель {}, действующий от своего имени, \
             на основании государственной регистрации физического лица в качестве \
             индивидуального предпринимателя ОГРНИП {}",
            full_name,
            opt(&party.ogrn)
        ),
        PartyKind::Company {
            form,
            company_name,
            position,
            acting_basis,
        } => {
            let position = position.as_deref().unwrap_or("Генерального директора");
            let basis = acting_basis.as_deref().unwrap_or("Устава");
            format!(
                "{} «{}», в лице {} {}, действующего на основании {}",
                form.full_name(),
                company_name,
                position,
                full_name,
                basis
            )
        }
        PartyKind::PrivateIndividual { identity_document } => {
            let mut text = full_name;
            if let Some(document) = identity_document {
                if !document.series.is_empty() && !document.number.is_empty() {
                    text.push_str(&format!(
                        ", паспорт серия {} № {}",
                        document.series, document.number
                    ));
                    if let Some(ref issuer) = document.issued_by {
                        text.push_str(&format!(", выдан {issuer}"));
                    }
                    if let Some(issued_on) = document.issued_on {
                        text.push_str(&format!(" {}", format_date_compact(issued_on)));
                    }
                }
            }
            text
        }
    }
}

/// Main requisites block of a client (without bank lines). Only non-empty
/// fields produce lines.
pub fn build_requisites_main(party: &Party) -> String {
    let mut lines = Vec::new();

    match &party.kind {
        PartyKind::SoleProprietor => {
            lines.push(format!(
                "ИНДИВИДУАЛЬНЫЙ ПРЕДПРИНИМАТЕЛЬ {}",
                party.representative.full().to_uppercase()
            ));
            if !party.address.is_empty() {
                lines.push(format!("Адрес регистрации: {}", party.address));
            }
            if let Some(ref inn) = party.inn {
                lines.push(format!("ИНН: {inn}"));
            }
            if let Some(ref ogrn) = party.ogrn {
                lines.push(format!("ОГРНИП: {ogrn}"));
            }
        }
        PartyKind::Company { form, company_name, .. } => {
            lines.push(format!("{} «{}»", form.short_name(), company_name));
            if !party.address.is_empty() {
                lines.push(format!("Юридический адрес: {}", party.address));
            }
            if let Some(ref ogrn) = party.ogrn {
                lines.push(format!("ОГРН: {ogrn}"));
            }
            if let Some(ref kpp) = party.kpp {
                lines.push(format!("КПП: {kpp}"));
            }
            if let Some(ref inn) = party.inn {
                lines.push(format!("ИНН: {inn}"));
            }
        }
        PartyKind::PrivateIndividual { .. } => {
            lines.push(party.representative.full());
            if !party.address.is_empty() {
                lines.push(format!("Адрес регистрации: {}", party.address));
            }
            if let Some(ref inn) = party.inn {
                lines.push(format!("ИНН: {inn}"));
            }
        }
    }

    if let Some(ref email) = party.email {
        lines.push(format!("E-mail: {email}"));
    }
    if let Some(ref phone) = party.phone {
        lines.push(format!("Тел.: {phone}"));
    }

    lines.join("\n")
}

/// Bank requisites block of a client; empty when there is neither a
/// settlement account nor a bank
pub fn build_requisites_bank(party: &Party) -> String {
    let mut lines = Vec::new();
    if let Some(ref account) = party.settlement_account {
        lines.push(format!("Р/С: {account}"));
    }
    if let Some(ref bank) = party.bank {
        lines.push(format!("БАНК: {}", bank.name));
        lines.push(format!("БИК: {}", bank.bik));
        lines.push(format!("К/С: {}", bank.correspondent_account));
    }
    lines.join("\n")
}

/// Combined requisites (legacy single-placeholder form)
pub fn build_requisites(party: &Party) -> String {
    let main = build_requisites_main(party);
    let bank = build_requisites_bank(party);
    if bank.is_empty() {
        main
    } else {
        format!("{main}\n\nБанковские реквизиты:\n{bank}")
    }
}

/// Main requisites block of the executor
pub fn executor_requisites_main(executor: &Executor) -> String {
    [
        executor.legal_name_upper(),
        format!("Юридический адрес: {}", executor.address),
        format!("ИНН: {}", executor.inn),
        format!("ОГРНИП: {}", executor.ogrnip),
        format!("E-mail: {}", executor.email),
        format!("Тел.: {}", executor.phone),
    ]
    .join("\n")
}

/// Bank requisites block of the executor
pub fn executor_requisites_bank(executor: &Executor) -> String {
    [
        format!("Р/С: {}", executor.settlement_account),
        format!("БАНК: {}", executor.bank.name),
        format!("БИК: {}", executor.bank.bik),
        format!("К/С: {}", executor.bank.correspondent_account),
    ]
    .join("\n")
}

/// Combined executor requisites (legacy single-placeholder form)
pub fn executor_requisites(executor: &Executor) -> String {
    format!(
        "{}\n\nБанковские реквизиты:\n{}",
        executor_requisites_main(executor),
        executor_requisites_bank(executor)
    )
}

/// Executor preamble clause used by the template builder
pub fn executor_preamble(executor: &Executor) -> String {
    format!(
        "Индивидуальный предприниматель {}, действующий от своего имени, \
         на основании государственной регистрации физического лица в качестве \
         индивидуального предпринимателя ОГРНИП {}, именуемый в дальнейшем «Исполнитель»",
        executor.name.full(),
        executor.ogrnip
    )
}

/// One-line client requisites for the invoice header
pub fn build_client_invoice_line(party: &Party) -> String {
    let initials = party.representative.initials();
    let mut parts = Vec::new();

    match &party.kind {
        PartyKind::SoleProprietor => {
            parts.push(format!("ИП {initials}"));
            if let Some(ref inn) = party.inn {
                parts.push(format!("ИНН {inn}"));
            }
            if let Some(ref ogrn) = party.ogrn {
                parts.push(format!("ОГРНИП {ogrn}"));
            }
        }
        PartyKind::Company { form, company_name, .. } => {
            parts.push(format!("{} «{}»", form.short_name(), company_name));
            if let Some(ref inn) = party.inn {
                parts.push(format!("ИНН {inn}"));
            }
            if let Some(ref ogrn) = party.ogrn {
                parts.push(format!("ОГРН {ogrn}"));
            }
            if let Some(ref kpp) = party.kpp {
                parts.push(format!("КПП {kpp}"));
            }
        }
        PartyKind::PrivateIndividual { .. } => {
            parts.push(initials);
            if let Some(ref inn) = party.inn {
                parts.push(format!("ИНН {inn}"));
            }
        }
    }

    parts.join(", ")
}

/// Build the full replacement vocabulary for one contract generation pass
pub fn build_replacements(
    agreement: &Agreement,
    total: Decimal,
    executor: &Executor,
) -> ReplacementMap {
    let client = &agreement.client;
    let date = agreement.date;
    let document = client.identity_document();

    let mut map = ReplacementMap::new();
    map.insert("{{day}}", date.day().to_string());
    map.insert(
        "{{date_text}}",
        format!("{} {}", month_name_genitive(date.month()), date.year()),
    );
    map.insert("{{client_type}}", client.kind.code());
    map.insert("{{client_name}}", client.name.clone());
    map.insert(
        "{{client_company_name}}",
        client.company_name().unwrap_or_default(),
    );
    map.insert("{{client_short_name}}", opt(&client.short_name));
    map.insert("{{client_full_name}}", client.representative.full());
    map.insert("{{client_first_name}}", client.representative.first.clone());
    map.insert("{{client_last_name}}", client.representative.last.clone());
    map.insert(
        "{{client_patronymic}}",
        opt(&client.representative.patronymic),
    );
    map.insert("{{client_ogrn}}", opt(&client.ogrn));
    map.insert("{{client_ogrnip}}", opt(&client.ogrn));
    map.insert("{{client_kpp}}", opt(&client.kpp));
    map.insert("{{client_address}}", client.address.clone());
    map.insert("{{client_inn}}", opt(&client.inn));
    map.insert("{{client_email}}", opt(&client.email));
    map.insert("{{client_phone}}", opt(&client.phone));
    map.insert("{{client_account}}", opt(&client.settlement_account));
    map.insert("{{client_position}}", client.position().unwrap_or_default());
    map.insert(
        "{{client_acting_basis}}",
        client.acting_basis().unwrap_or_default(),
    );
    map.insert("{{client_header}}", build_preamble(client));

    map.insert(
        "{{client_passport_series}}",
        document.map(|d| d.series.clone()).unwrap_or_default(),
    );
    map.insert(
        "{{client_passport_number}}",
        document.map(|d| d.number.clone()).unwrap_or_default(),
    );
    map.insert(
        "{{client_passport_issued_by}}",
        document
            .and_then(|d| d.issued_by.clone())
            .unwrap_or_default(),
    );
    map.insert(
        "{{client_passport_issued_date}}",
        document
            .and_then(|d| d.issued_on)
            .map(format_date_compact)
            .unwrap_or_default(),
    );

    let bank = client.bank.as_ref();
    map.insert(
        "{{bank_name}}",
        bank.map(|b| b.name.clone()).unwrap_or_default(),
    );
    map.insert(
        "{{bank_bik}}",
        bank.map(|b| b.bik.clone()).unwrap_or_default(),
    );
    map.insert(
        "{{bank_corr}}",
        bank.map(|b| b.correspondent_account.clone())
            .unwrap_or_default(),
    );

    map.insert("{{signatory}}", client.representative.initials());
    map.insert("{{contract_number}}", agreement.number.clone());
    map.insert("{{contract_date}}", format_date_compact(date));

    map.insert("{{requisites}}", build_requisites(client));
    map.insert("{{executor_requisites}}", executor_requisites(executor));
    map.insert("{{requisites_main}}", build_requisites_main(client));
    map.insert("{{requisites_bank}}", build_requisites_bank(client));
    map.insert("{{executor_main}}", executor_requisites_main(executor));
    map.insert("{{executor_bank}}", executor_requisites_bank(executor));

    map.insert(
        "{{total_price}}",
        format!(
            "{} руб. ({})",
            format_amount_whole(total),
            amount_in_words(total)
        ),
    );

    map
}

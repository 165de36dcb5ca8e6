//! The fixed field schema of an acórdão detail page.
//!
//! Each field maps to one column of the candidate table. Primary fields are
//! read from an element id on the detail page; companions are derived from
//! another field's element or injected by the crawler.

use std::collections::BTreeMap;

/// A persisted attribute of a candidate record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    DecisionNumber,
    DecisionNumberHref,
    Rapporteur,
    ProcessNumber,
    ProcessType,
    SessionDate,
    MinutesNumber,
    MinutesNumberHref,
    InterestedParty,
    Entity,
    PublicMinistryRepresentative,
    TechnicalUnit,
    LegalRepresentative,
    Subject,
    Summary,
    DecisionText,
    Quorum,
    ReportText,
    VoteText,
    DetailUrl,
}

impl Field {
    /// Every field, in column order.
    pub const ALL: [Field; 20] = [
        Field::DecisionNumber,
        Field::DecisionNumberHref,
        Field::Rapporteur,
        Field::ProcessNumber,
        Field::ProcessType,
        Field::SessionDate,
        Field::MinutesNumber,
        Field::MinutesNumberHref,
        Field::InterestedParty,
        Field::Entity,
        Field::PublicMinistryRepresentative,
        Field::TechnicalUnit,
        Field::LegalRepresentative,
        Field::Subject,
        Field::Summary,
        Field::DecisionText,
        Field::Quorum,
        Field::ReportText,
        Field::VoteText,
        Field::DetailUrl,
    ];

    /// Fields read directly from an element id on the detail page.
    pub const PRIMARY: [Field; 17] = [
        Field::DecisionNumber,
        Field::Rapporteur,
        Field::ProcessNumber,
        Field::ProcessType,
        Field::SessionDate,
        Field::MinutesNumber,
        Field::InterestedParty,
        Field::Entity,
        Field::PublicMinistryRepresentative,
        Field::TechnicalUnit,
        Field::LegalRepresentative,
        Field::Subject,
        Field::Summary,
        Field::DecisionText,
        Field::Quorum,
        Field::ReportText,
        Field::VoteText,
    ];

    /// Column name in the candidate table.
    pub fn column(&self) -> &'static str {
        match self {
            Self::DecisionNumber => "numero_acordao",
            Self::DecisionNumberHref => "numero_acordao_href",
            Self::Rapporteur => "relator",
            Self::ProcessNumber => "processo",
            Self::ProcessType => "tipo_processo",
            Self::SessionDate => "data_sessao",
            Self::MinutesNumber => "numero_ata",
            Self::MinutesNumberHref => "numero_ata_href",
            Self::InterestedParty => "interessado_reponsavel_recorrente",
            Self::Entity => "entidade",
            Self::PublicMinistryRepresentative => "representante_mp",
            Self::TechnicalUnit => "unidade_tecnica",
            Self::LegalRepresentative => "repr_legal",
            Self::Subject => "assunto",
            Self::Summary => "sumario",
            Self::DecisionText => "acordao",
            Self::Quorum => "quorum",
            Self::ReportText => "relatorio",
            Self::VoteText => "voto",
            Self::DetailUrl => "url_tcu",
        }
    }

    /// Element id holding this field on the detail page.
    ///
    /// `None` for companions, which have no element of their own.
    pub fn dom_id(&self) -> Option<&'static str> {
        let id = match self {
            Self::DecisionNumber => "conteudo_numero_acordao",
            Self::Rapporteur => "conteudo_relator",
            Self::ProcessNumber => "conteudo_processo",
            Self::ProcessType => "conteudo_tipo_processo",
            Self::SessionDate => "conteudo_data_sessao",
            Self::MinutesNumber => "conteudo_numero_ata",
            Self::InterestedParty => "conteudo_interessado",
            Self::Entity => "conteudo_entidade",
            Self::PublicMinistryRepresentative => "conteudo_representante_mp",
            Self::TechnicalUnit => "conteudo_unidade_tecnica",
            // The portal's own spelling.
            Self::LegalRepresentative => "conteudo_representante_leval",
            Self::Subject => "conteudo_assunto",
            Self::Summary => "conteudo_sumario",
            Self::DecisionText => "conteudo_acordao",
            Self::Quorum => "conteudo_quorum",
            Self::ReportText => "conteudo_relatorio",
            Self::VoteText => "conteudo_voto",
            Self::DecisionNumberHref | Self::MinutesNumberHref | Self::DetailUrl => return None,
        };
        Some(id)
    }

    /// The href companion resolved from this field's element, if any.
    pub fn href_companion(&self) -> Option<Field> {
        match self {
            Self::DecisionNumber => Some(Self::DecisionNumberHref),
            Self::MinutesNumber => Some(Self::MinutesNumberHref),
            _ => None,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Field values keyed by field; `None` means "not obtained".
pub type FieldSet = BTreeMap<Field, Option<String>>;

/// Strip line breaks and single quotes from text bound for the store.
pub fn sanitize(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .map(|c| if c == '\'' { ' ' } else { c })
        .collect()
}

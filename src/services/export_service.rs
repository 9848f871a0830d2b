// src/services/export_service.rs

use rust_xlsxwriter::{Format, Workbook};

use crate::{
    common::error::AppError,
    models::referral::{ExportFormat, ReferralDetail},
};

pub const SHEET_NAME: &str = "Indicações";

pub const HEADERS: [&str; 10] = [
    "Data",
    "Status",
    "Indicador",
    "E-mail do indicador",
    "Telefone do indicador",
    "Indicado",
    "E-mail do indicado",
    "Telefone do indicado",
    "Unidade",
    "Motivo da reprovação",
];

// Uma linha da planilha, na ordem de HEADERS
fn row_values(referral: &ReferralDetail) -> [String; 10] {
    [
        referral.created_at.format("%d/%m/%Y %H:%M").to_string(),
        referral.status.label().to_string(),
        referral.referrer_name.clone(),
        referral.referrer_email.clone(),
        referral.referrer_phone.clone().unwrap_or_default(),
        referral.referred_name.clone(),
        referral.referred_email.clone(),
        referral.referred_phone.clone().unwrap_or_default(),
        referral.unit_name.clone().unwrap_or_default(),
        referral.rejection_reason.clone().unwrap_or_default(),
    ]
}

/// Planilha Excel com uma aba e uma linha por indicação.
pub fn to_xlsx(referrals: &[ReferralDetail]) -> Result<Vec<u8>, AppError> {
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| AppError::ExportError(e.to_string());

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(xlsx_err)?;

    for (col, header) in HEADERS.iter().enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, *header, &header_format)
            .map_err(xlsx_err)?;
        worksheet.set_column_width(col, 22).map_err(xlsx_err)?;
    }

    for (index, referral) in referrals.iter().enumerate() {
        let row = index as u32 + 1;
        for (col, value) in row_values(referral).iter().enumerate() {
            worksheet
                .write_string(row, col as u16, value)
                .map_err(xlsx_err)?;
        }
    }

    workbook.save_to_buffer().map_err(xlsx_err)
}

/// Mesmas colunas da planilha, em CSV.
pub fn to_csv(referrals: &[ReferralDetail]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(HEADERS)
        .map_err(|e| AppError::ExportError(e.to_string()))?;
    for referral in referrals {
        writer
            .write_record(row_values(referral))
            .map_err(|e| AppError::ExportError(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::ExportError(e.to_string()))
}

pub fn export(format: ExportFormat, referrals: &[ReferralDetail]) -> Result<Vec<u8>, AppError> {
    match format {
        ExportFormat::Xlsx => to_xlsx(referrals),
        ExportFormat::Csv => to_csv(referrals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::referral::{sample_detail, ReferralStatus};

    #[test]
    fn xlsx_is_a_zip_container() {
        let rows = vec![sample_detail(ReferralStatus::Aprovado, None, "Carlos Lima")];
        let bytes = to_xlsx(&rows).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn empty_export_still_has_headers() {
        let csv = String::from_utf8(to_csv(&[]).unwrap()).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("Data,Status,Indicador"));
        assert!(to_xlsx(&[]).is_ok());
    }

    #[test]
    fn csv_has_one_row_per_referral_with_rejection_reason() {
        let rows = vec![
            sample_detail(ReferralStatus::SemInteresse, None, "Carlos Lima"),
            sample_detail(ReferralStatus::Indicacao, None, "Bruno Reis"),
        ];
        let csv = to_csv(&rows).unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_slice());
        let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][1], "Sem Interesse ou Reprovado");
        assert_eq!(&records[0][5], "Carlos Lima");
        assert_eq!(&records[0][9], "cliente desistiu");
        assert_eq!(&records[1][9], "");
    }

    #[test]
    fn format_picks_the_writer() {
        let rows = vec![sample_detail(ReferralStatus::Indicacao, None, "Bruno Reis")];
        let csv = export(ExportFormat::Csv, &rows).unwrap();
        assert!(csv.starts_with(b"Data,"));
        let xlsx = export(ExportFormat::default(), &rows).unwrap();
        assert_eq!(&xlsx[..2], b"PK");
        assert_eq!(ExportFormat::Csv.file_name(), "indicacoes.csv");
    }
}

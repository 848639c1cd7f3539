// src/services/batch_service.rs

use std::path::PathBuf;

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BatchRepository, IngredientRepository},
    models::{
        batch::{
            apply_units_delta, derive_batch_number, expiry_date_for, Batch, BatchStatus, BatchTrace,
            CreateBatchRequest, QcChecklist,
        },
        ingredient::LotStatus,
    },
};

#[derive(Clone)]
pub struct BatchService {
    repo: BatchRepository,
    ingredient_repo: IngredientRepository,
    fonts_dir: PathBuf,
}

/// Status que o lote assume depois de uma baixa/devolução de unidades.
/// Lote rejeitado só pode ser baixado; um lote esgotado que recebe unidades volta a
/// `released` apenas com o checklist completo, senão fica em quarentena.
pub fn status_after_units(
    current: BatchStatus,
    checklist: &QcChecklist,
    delta: i32,
    units_in_stock: i32,
) -> Result<BatchStatus, AppError> {
    let status = match (current, units_in_stock) {
        (BatchStatus::Rejected, _) if delta > 0 => return Err(AppError::BatchRejected),
        (BatchStatus::Rejected, _) => BatchStatus::Rejected,
        (_, 0) => BatchStatus::Depleted,
        (BatchStatus::Depleted, _) if checklist.passed() => BatchStatus::Released,
        (BatchStatus::Depleted, _) => BatchStatus::Quarantine,
        (status, _) => status,
    };
    Ok(status)
}

/// Valida uma troca manual de status contra o checklist e as unidades em estoque.
pub fn check_status_change(
    checklist: &QcChecklist,
    units_in_stock: i32,
    target: BatchStatus,
) -> Result<(), AppError> {
    match target {
        BatchStatus::Depleted if units_in_stock > 0 => Err(AppError::BatchStatusMismatch),
        BatchStatus::Quarantine | BatchStatus::Released if units_in_stock == 0 => {
            Err(AppError::BatchStatusMismatch)
        }
        BatchStatus::Released if !checklist.passed() => Err(AppError::QcNotPassed),
        _ => Ok(()),
    }
}

impl BatchService {
    pub fn new(repo: BatchRepository, ingredient_repo: IngredientRepository, fonts_dir: PathBuf) -> Self {
        Self {
            repo,
            ingredient_repo,
            fonts_dir,
        }
    }

    pub async fn list_batches(&self, product_id: Option<Uuid>) -> Result<Vec<Batch>, AppError> {
        self.repo.list_batches(product_id).await
    }

    pub async fn get_batch(&self, batch_id: Uuid) -> Result<Batch, AppError> {
        self.repo
            .get_batch(batch_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Lote".into()))
    }

    // --- CRIAÇÃO (lote + baixa dos insumos numa única transação) ---
    pub async fn create_batch<'e, E>(
        &self,
        executor: E,
        created_by: Uuid,
        request: &CreateBatchRequest,
    ) -> Result<Batch, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let units_in_stock = request.units_in_stock.unwrap_or(request.batch_size);
        if units_in_stock > request.batch_size {
            return Err(AppError::BatchUnitsOutOfRange {
                batch_size: request.batch_size,
            });
        }

        let mut tx = executor.begin().await?;

        // 1. Produto (nome para o número do lote, validade em meses)
        let product = self
            .repo
            .find_product_info(&mut *tx, request.product_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Produto".into()))?;

        let expiry_date = expiry_date_for(request.manufacturing_date, product.shelf_life_months)
            .ok_or_else(|| anyhow::anyhow!("Validade fora do calendário para o produto {}", request.product_id))?;

        // 2. Número do lote
        let sequence = self
            .repo
            .count_batches_on(&mut *tx, request.product_id, request.manufacturing_date)
            .await?
            + 1;
        let batch_number = derive_batch_number(&product.name, request.manufacturing_date, sequence);

        // 3. Grava o lote
        let batch = self
            .repo
            .insert_batch(
                &mut *tx,
                request.product_id,
                &batch_number,
                request.manufacturing_date,
                expiry_date,
                request.batch_size,
                units_in_stock,
                request.notes.as_deref(),
                created_by,
            )
            .await?;

        // 4. Baixa e vínculo de cada lote de insumo
        for usage in &request.ingredients {
            let lot = self
                .ingredient_repo
                .get_lot_for_update(&mut *tx, usage.stock_lot_id)
                .await?
                .ok_or_else(|| AppError::ResourceNotFound("Lote de insumo".into()))?;

            if lot.status != LotStatus::Available || lot.quantity < usage.quantity {
                return Err(AppError::InsufficientStock(format!(
                    "{} (disponível: {})",
                    lot.lot_number.as_deref().unwrap_or("sem número"),
                    lot.quantity
                )));
            }

            let remaining = lot.quantity - usage.quantity;
            let status = if remaining.is_zero() {
                LotStatus::Depleted
            } else {
                LotStatus::Available
            };

            self.ingredient_repo
                .set_lot_quantity(&mut *tx, lot.id, remaining, status)
                .await?;
            self.repo
                .link_ingredient(&mut *tx, batch.id, lot.id, usage.quantity)
                .await?;
        }

        tx.commit().await?;

        tracing::info!("🏷️  Lote {} criado ({} unidades)", batch.batch_number, batch.batch_size);
        Ok(batch)
    }

    // --- ESTOQUE DE UNIDADES ---
    pub async fn adjust_units<'e, E>(
        &self,
        executor: E,
        batch_id: Uuid,
        delta: i32,
    ) -> Result<Batch, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let batch = self
            .repo
            .get_batch_for_update(&mut *tx, batch_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Lote".into()))?;

        let units = apply_units_delta(batch.units_in_stock, batch.batch_size, delta).ok_or(
            AppError::BatchUnitsOutOfRange {
                batch_size: batch.batch_size,
            },
        )?;

        let status = status_after_units(batch.status, &batch.qc_checklist, delta, units)?;

        let updated = self
            .repo
            .update_units(&mut *tx, batch_id, units, status)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    // --- CONTROLE DE QUALIDADE ---
    pub async fn update_qc<'e, E>(
        &self,
        executor: E,
        batch_id: Uuid,
        checklist: &QcChecklist,
    ) -> Result<Batch, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_qc(executor, batch_id, checklist)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Lote".into()))
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        batch_id: Uuid,
        status: BatchStatus,
    ) -> Result<Batch, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let batch = self
            .repo
            .get_batch_for_update(&mut *tx, batch_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Lote".into()))?;

        check_status_change(&batch.qc_checklist, batch.units_in_stock, status)?;

        let updated = self.repo.update_status(&mut *tx, batch_id, status).await?;
        tx.commit().await?;

        tracing::info!("🧾 Lote {} agora está {:?}", updated.batch_number, updated.status);
        Ok(updated)
    }

    // --- RASTREABILIDADE ---
    pub async fn trace(&self, batch_id: Uuid) -> Result<BatchTrace, AppError> {
        let batch = self.get_batch(batch_id).await?;
        let product_name = self
            .repo
            .get_product_name(batch.product_id)
            .await?
            .unwrap_or_default();
        let ingredients = self.repo.list_traced_lots(batch_id).await?;

        Ok(BatchTrace {
            batch,
            product_name,
            ingredients,
        })
    }

    // --- ETIQUETA (PDF com QR code do número do lote) ---
    pub async fn label_pdf(&self, batch_id: Uuid) -> Result<(String, Vec<u8>), AppError> {
        let trace = self.trace(batch_id).await?;

        let fonts_dir = self.fonts_dir.to_string_lossy().to_string();
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, "Roboto", None)
            .map_err(|_| AppError::FontNotFound(fonts_dir))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Lote {}", trace.batch.batch_number));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(
            elements::Paragraph::new(trace.product_name.clone())
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(
            elements::Paragraph::new(format!("LOTE {}", trace.batch.batch_number))
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Break::new(1));

        doc.push(elements::Paragraph::new(format!(
            "Fabricação: {}",
            trace.batch.manufacturing_date.format("%d/%m/%Y")
        )));
        doc.push(elements::Paragraph::new(format!(
            "Validade: {}",
            trace.batch.expiry_date.format("%d/%m/%Y")
        )));
        doc.push(elements::Break::new(1.5));

        // --- COMPOSIÇÃO ---
        if !trace.ingredients.is_empty() {
            let mut table = elements::TableLayout::new(vec![4, 2, 2]);
            table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

            let style_bold = style::Style::new().bold();
            table
                .row()
                .element(elements::Paragraph::new("Insumo").styled(style_bold))
                .element(elements::Paragraph::new("Lote").styled(style_bold))
                .element(elements::Paragraph::new("Qtd").styled(style_bold))
                .push()
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;

            for lot in &trace.ingredients {
                table
                    .row()
                    .element(elements::Paragraph::new(lot.ingredient_name.clone()))
                    .element(elements::Paragraph::new(lot.lot_number.clone().unwrap_or_else(|| "-".into())))
                    .element(elements::Paragraph::new(format_quantity(lot.quantity)))
                    .push()
                    .map_err(|e| anyhow::anyhow!(e.to_string()))?;
            }

            doc.push(table);
            doc.push(elements::Break::new(1.5));
        }

        // --- QR CODE ---
        let code = QrCode::new(trace.batch.batch_number.as_bytes())
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;
        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);
        let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .with_scale(genpdf::Scale::new(0.5, 0.5));
        doc.push(pdf_image);

        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;

        Ok((trace.batch.batch_number, buffer))
    }
}

fn format_quantity(quantity: Decimal) -> String {
    quantity.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_checklist() -> QcChecklist {
        QcChecklist {
            appearance: true,
            color: true,
            odor: true,
            ph: true,
            viscosity: true,
            packaging_integrity: true,
            label_accuracy: true,
        }
    }

    #[test]
    fn release_requires_every_qc_flag() {
        let mut checklist = full_checklist();
        assert!(check_status_change(&checklist, 40, BatchStatus::Released).is_ok());

        checklist.ph = false;
        assert!(matches!(
            check_status_change(&checklist, 40, BatchStatus::Released),
            Err(AppError::QcNotPassed)
        ));
        // Rejeitar não depende do checklist
        assert!(check_status_change(&checklist, 40, BatchStatus::Rejected).is_ok());
    }

    #[test]
    fn manual_status_must_agree_with_units_in_stock() {
        let checklist = full_checklist();
        assert!(matches!(
            check_status_change(&checklist, 12, BatchStatus::Depleted),
            Err(AppError::BatchStatusMismatch)
        ));
        assert!(matches!(
            check_status_change(&checklist, 0, BatchStatus::Released),
            Err(AppError::BatchStatusMismatch)
        ));
        assert!(matches!(
            check_status_change(&checklist, 0, BatchStatus::Quarantine),
            Err(AppError::BatchStatusMismatch)
        ));
        assert!(check_status_change(&checklist, 0, BatchStatus::Depleted).is_ok());
        assert!(check_status_change(&checklist, 0, BatchStatus::Rejected).is_ok());
    }

    #[test]
    fn zero_units_depletes_and_restock_releases_only_after_qc() {
        let passed = full_checklist();
        let pending = QcChecklist::default();

        assert_eq!(
            status_after_units(BatchStatus::Released, &passed, -10, 0).unwrap(),
            BatchStatus::Depleted
        );
        assert_eq!(
            status_after_units(BatchStatus::Depleted, &passed, 5, 5).unwrap(),
            BatchStatus::Released
        );
        assert_eq!(
            status_after_units(BatchStatus::Quarantine, &pending, 5, 5).unwrap(),
            BatchStatus::Quarantine
        );
    }

    #[test]
    fn drained_quarantine_batch_is_not_released_on_restock() {
        let pending = QcChecklist::default();

        let drained = status_after_units(BatchStatus::Quarantine, &pending, -20, 0).unwrap();
        assert_eq!(drained, BatchStatus::Depleted);
        assert_eq!(
            status_after_units(drained, &pending, 5, 5).unwrap(),
            BatchStatus::Quarantine
        );
    }

    #[test]
    fn rejected_batch_can_be_drained_but_never_restocked() {
        let passed = full_checklist();

        let drained = status_after_units(BatchStatus::Rejected, &passed, -20, 0).unwrap();
        assert_eq!(drained, BatchStatus::Rejected);
        assert!(matches!(
            status_after_units(drained, &passed, 5, 5),
            Err(AppError::BatchRejected)
        ));
    }

    #[test]
    fn quantities_print_without_trailing_zeros() {
        assert_eq!(format_quantity(Decimal::new(2500, 3)), "2.5");
        assert_eq!(format_quantity(Decimal::new(3, 0)), "3");
    }
}

use super::types::{OrganizationInfo, SetOrganizationReq};
use super::OrganizationService;
use crate::database::OrganizationUpdate;
use crate::error::{AppError, AppResult};

impl OrganizationService {
    pub async fn get_organization(&self) -> AppResult<OrganizationInfo> {
        Ok(self.database.get_organization().await?.into())
    }

    pub async fn set_organization(&self, req: SetOrganizationReq) -> AppResult<()> {
        if matches!(req.name.as_deref(), Some("")) {
            return Err(AppError::args("name is empty"));
        }
        let update = OrganizationUpdate {
            logo_url: req.logo_url,
            name: req.name,
            homepage: req.homepage,
            introduction: req.introduction,
        };
        if update.is_empty() {
            return Err(AppError::args("no field to update"));
        }
        self.database.set_organization(update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::harness;

    #[tokio::test]
    async fn test_set_then_get() {
        let h = harness(&[]).await;
        h.service
            .set_organization(SetOrganizationReq {
                name: Some("Acme".into()),
                homepage: Some("https://acme.test".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        h.service
            .set_organization(SetOrganizationReq {
                introduction: Some("We make anvils".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let org = h.service.get_organization().await.unwrap();
        assert_eq!(org.name, "Acme");
        assert_eq!(org.homepage, "https://acme.test");
        assert_eq!(org.introduction, "We make anvils");
        assert_eq!(org.logo_url, "");
    }

    #[tokio::test]
    async fn test_set_rejects_empty_patch_and_name() {
        let h = harness(&[]).await;
        let err = h.service.set_organization(SetOrganizationReq::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Args(_)));

        let err = h
            .service
            .set_organization(SetOrganizationReq {
                name: Some(String::new()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Args(_)));
    }
}
